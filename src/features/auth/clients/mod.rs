mod gotrue_client;

pub use gotrue_client::{
    AuthClientError, AuthProvider, AuthUser, GoTrueClient, Session, SignUpOutcome, SignUpRequest,
};
