//! Message catalog shared by resolver errors and trace events.
//!
//! Error messages are composed as `generic_resolver_error(dtmi)` followed by
//! one cause suffix, so callers can match on exact text.

pub fn generic_resolver_error(dtmi: &str) -> String {
    format!("Unable to resolve \"{dtmi}\". ")
}

pub fn client_init_with_fetcher(scheme: &str) -> String {
    format!("Client session initialized with {scheme} content fetcher.")
}

pub fn processing_dtmi(dtmi: &str) -> String {
    format!("Processing DTMI \"{dtmi}\". ")
}

pub fn skipping_pre_processed_dtmi(dtmi: &str) -> String {
    format!("Already processed DTMI \"{dtmi}\". Skipping.")
}

pub fn fetching_content(path: &str) -> String {
    format!("Attempting to retrieve model content from \"{path}\". ")
}

pub fn discovered_dependencies<S: AsRef<str>>(dependencies: &[S]) -> String {
    let joined = dependencies
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Discovered dependencies \"{joined}\". ")
}

pub fn incorrect_dtmi_casing(expected: &str, parsed: &str) -> String {
    format!(
        "Retrieved model content has incorrect DTMI casing. Expected \"{expected}\", parsed \"{parsed}\". "
    )
}

pub fn invalid_dtmi_format(dtmi: &str) -> String {
    format!("Invalid DTMI format \"{dtmi}\". ")
}

pub fn content_not_found(path: &str) -> String {
    format!("Model content \"{path}\" was not found in the target repository. ")
}

pub fn failed_dependency(dependency: &str) -> String {
    format!("Failed to resolve dependency \"{dependency}\". ")
}

pub fn error_access_local_repository_model(path: &str) -> String {
    format!("Model file \"{path}\" not found or not accessible in target repository.")
}

pub fn error_access_remote_repository_model(path: &str) -> String {
    format!("Failure handling \"{path}\".")
}
