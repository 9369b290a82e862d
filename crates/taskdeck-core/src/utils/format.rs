use crate::models::Task;

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Show only the first few characters of a bearer token
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if visible.chars().count() == token.chars().count() {
        "*".repeat(token.chars().count().max(1))
    } else {
        format!("{}…", visible)
    }
}

/// One-line rendering of a task: `[x] #12  Title - description`
pub fn task_line(task: &Task, width: usize) -> String {
    let mark = if task.completed { "x" } else { " " };
    let text = if task.description.is_empty() {
        task.title.clone()
    } else {
        format!("{} - {}", task.title, task.description)
    };
    format!("[{}] #{:<4} {}", mark, task.id, truncate(&text, width))
}
