/// Render `lines` inside a boxed block comment.
pub fn box_comment(lines: &[String]) -> String {
    let lines: Vec<String> = lines.iter().map(|l| l.replace("*/", "* /")).collect();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("/{}\n", "*".repeat(width + 4)));
    for line in &lines {
        let padding = width - line.chars().count();
        out.push_str(&format!(" * {}{} *\n", line, " ".repeat(padding)));
    }
    out.push_str(&format!(" {}/\n", "*".repeat(width + 3)));
    out
}
