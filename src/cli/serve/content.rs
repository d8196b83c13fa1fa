//! Live reload script injection.

/// Inject the live reload script if content is HTML and reload is enabled
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, reload: bool) -> Vec<u8> {
    if reload && content_type.starts_with("text/html") {
        inject_livereload_script(&body)
    } else {
        body
    }
}

/// Inject the script tag before the last `</body>`
fn inject_livereload_script(content: &[u8]) -> Vec<u8> {
    let script = crate::embed::serve::script_tag();
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    match content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        Some(pos) => {
            result.extend_from_slice(&content[..pos]);
            result.extend_from_slice(script_bytes);
            result.extend_from_slice(&content[pos..]);
        }
        // No </body>: append, browsers handle this gracefully
        None => {
            result.extend_from_slice(content);
            result.extend_from_slice(script_bytes);
        }
    }
    result
}
