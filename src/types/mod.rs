pub use self::hub::{
    CallbackQuery, HubMode, HubRequest, SIGNATURE_HEADER, VERIFY_ASYNC,
};

mod hub;
