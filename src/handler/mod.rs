pub mod confirmation;
pub mod discovery;
pub mod push_verifier;
pub mod subscriber_client;

pub use self::{
    confirmation::{handle_denied, handle_subscribe, handle_unsubscribe},
    discovery::{discover, parse_link_headers, HubLinks},
    push_verifier::{handle_push, sign, verify_signature, PushOutcome},
    subscriber_client::{generate_secret, SubscriberClient, SECRET_LENGTH},
};
