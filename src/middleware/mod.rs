mod client_ctx;

pub use client_ctx::ClientCtx;
pub use client_ctx::SESSION_USER_KEY;
