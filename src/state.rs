// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    services::{link_issuer::LinkIssuer, policy::AccessPolicy},
    store::QuizStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuizStore>,
    pub config: Config,
    pub links: LinkIssuer,
    pub policy: AccessPolicy,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn QuizStore>) -> Self {
        Self {
            links: LinkIssuer::new(config.link_length),
            policy: AccessPolicy::new(config.admin_role.clone()),
            store,
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
