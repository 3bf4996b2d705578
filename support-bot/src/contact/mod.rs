//! Contact-lookup adapters. The Airtable client is used when configured;
//! otherwise callers fall back to [`support_core::StaticLookup`].

mod airtable;

pub use airtable::AirtableLookup;
