use failure;

/// Renders an error and every cause beneath it on one line, outermost first.
pub fn failure_to_string(e: &failure::Error) -> String {
    e.iter_chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<String>>()
        .join(": ")
}
