//! Strips code-fence wrappers and leading prose from a raw completion
//! (spec.md §4.7), the same multi-strategy extraction the teacher's
//! Python-extractor generator uses: an explicit ` ```python ` fence,
//! then a generic fence, then a heuristic scan for `import`/assignment
//! lines.

pub fn extract_code_block(response: &str) -> String {
    if let Some(start) = response.find("```python") {
        let code_start = start + "```python".len();
        if let Some(end) = response[code_start..].find("```") {
            return response[code_start..code_start + end].trim().to_string();
        }
    }

    if let Some(start) = response.find("```") {
        let code_start = start + 3;
        let code_start = match response[code_start..].find('\n') {
            Some(newline) => code_start + newline + 1,
            None => code_start,
        };
        if let Some(end) = response[code_start..].find("```") {
            return response[code_start..code_start + end].trim().to_string();
        }
    }

    let lines: Vec<&str> = response.lines().collect();
    let mut in_code = false;
    let mut code_lines = Vec::new();
    let mut indent_level = 0;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with("import ")
            || trimmed.starts_with("from ")
            || trimmed.starts_with("result")
        {
            in_code = true;
        }

        if in_code {
            code_lines.push(line);
            if !trimmed.is_empty() {
                let current_indent = line.len() - line.trim_start().len();
                if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
                    indent_level = current_indent;
                } else if current_indent <= indent_level && code_lines.len() > 1 {
                    // heuristic: a line back at base indent that looks
                    // like trailing prose ends the code block
                    if !trimmed.starts_with("import ")
                        && !trimmed.starts_with("from ")
                        && trimmed.chars().next().map(|c| c.is_alphabetic()).unwrap_or(false)
                        && !trimmed.contains('=')
                        && !trimmed.contains('(')
                    {
                        code_lines.pop();
                        break;
                    }
                }
            }
        }
    }

    if code_lines.is_empty() {
        response.trim().to_string()
    } else {
        code_lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_python_block() {
        let response = "Here's the code:\n\n```python\nresult = {\"type\": \"scalar\", \"value\": 1}\n```\n\nDone.";
        let code = extract_code_block(response);
        assert!(code.contains("result ="));
        assert!(!code.contains("```"));
    }

    #[test]
    fn extracts_generic_fenced_block() {
        let response = "```\nimport math\nresult = {\"type\": \"scalar\", \"value\": math.pi}\n```";
        let code = extract_code_block(response);
        assert!(code.contains("import math"));
        assert!(code.contains("result ="));
    }

    #[test]
    fn falls_back_to_heuristic_scan_without_fences() {
        let response = "import math\nresult = {\"type\": \"scalar\", \"value\": 1}\n\nLet me know if that helps!";
        let code = extract_code_block(response);
        assert!(code.contains("import math"));
        assert!(code.contains("result ="));
        assert!(!code.contains("Let me know"));
    }
}
