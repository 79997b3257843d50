pub mod constants;
pub mod prompts;
pub mod tabular;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
pub mod validation;
