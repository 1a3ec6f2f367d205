use super::GenerationRequest;

/// Work handed from the interactive loop to the action service
#[derive(Debug)]
pub enum Action {
    Generate(GenerationRequest),
    ReloadCredential(String), // Credential file path
}
