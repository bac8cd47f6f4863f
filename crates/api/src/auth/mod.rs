//! Bearer token verification; see [`jwt`].

pub mod jwt;
