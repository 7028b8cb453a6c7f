//! HTTP clients for the services LeadBaze delegates to: the Supabase
//! backend, the n8n lead generator, the Evolution WhatsApp API and Kommo.

pub mod backend;
pub mod error;
pub mod generator;
mod http;
pub mod kommo;
pub mod poll;
mod retry;
pub mod whatsapp;

pub use backend::BackendClient;
pub use error::ClientError;
pub use generator::{GenerationRequest, GenerationResult, GeneratorClient};
pub use kommo::{authorize_url, generate_state, validate_subdomain, KommoConnect, KommoConnection};
pub use poll::{poll_resource, PollEvent, PollOptions, PollSubscription};
pub use whatsapp::{ConnectionState, InstanceInfo, QrCode, WhatsappClient};
