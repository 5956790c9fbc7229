//! Mutation façade over the hosted backend.
//!
//! One operation per record kind and verb, present only where the product
//! needs it: jobs create/update/delete, clients create/update, invoices
//! create/update, communications create. Every successful mutation is
//! followed by exactly one full snapshot reload (read-after-write via full
//! refetch, no optimistic patching); a rejected mutation propagates to the
//! caller without a reload.

mod clients;
mod communications;
mod invoices;
mod jobs;
