//! Outbound API implementations for the SUMA chat relay.
//!
//! - [`responses`] — completion gateway against the OpenAI Responses API
//! - [`resend`]    — contact-form mailer against the Resend email API
//!
//! Both implement the traits defined in `sumarelay-core`, so everything
//! above this crate can run against stubs in tests.

pub mod resend;
pub mod responses;

pub use resend::ResendMailer;
pub use responses::OpenAiResponsesProvider;
