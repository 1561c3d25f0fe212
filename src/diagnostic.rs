/// Render a failure as `"<message> @ Line <n>, Col <c>"`, the offending line,
/// and a caret under column `column` (0-based, in characters).
pub fn render(line_text: &str, column: u32, line_number: u32, message: &str) -> String {
    let pointer_width = column as usize;
    let mut out = String::with_capacity(message.len() + line_text.len() + pointer_width + 32);
    out.push_str(message);
    out.push_str(" @ Line ");
    out.push_str(&line_number.to_string());
    out.push_str(", Col ");
    out.push_str(&column.to_string());
    out.push('\n');
    out.push_str(line_text);
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', pointer_width));
    out.push('^');
    out
}
