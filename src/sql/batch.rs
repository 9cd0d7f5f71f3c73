//! Batch splitting on the `GO` separator

/// Split a script into batches on `GO` lines.
///
/// The separator must stand alone on its line (case-insensitive, optional
/// trailing `;`). Batches that are empty after trimming are dropped.
pub fn split_batches(script: &str) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();

    for line in script.lines() {
        if is_separator(line) {
            push_batch(&mut batches, &mut current);
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_batch(&mut batches, &mut current);

    batches
}

fn is_separator(line: &str) -> bool {
    line.trim().trim_end_matches(';').trim_end().eq_ignore_ascii_case("go")
}

fn push_batch(batches: &mut Vec<String>, current: &mut String) {
    let batch = current.trim();
    if !batch.is_empty() {
        batches.push(batch.to_string());
    }
    current.clear();
}
