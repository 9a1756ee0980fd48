//! aap-auth
//!
//! Bearer-token verification for the AAP HTTP surface. Tokens are issued by
//! an external OAuth2 server; this crate only checks them.

pub mod error;
pub mod jwt;
