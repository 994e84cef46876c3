use rand::Rng;
use rand::seq::IndexedRandom as _;

use crate::catalog::PayloadCatalog;
use crate::classify::{Classification, TrafficClass, TrafficClassifier};
use crate::error::Result;

const LEGACY_AGENTS: usize = 3;
const LEGACY_AGENT_PROBABILITY: f64 = 0.3;

/// One simulated request decision. Built fresh for every loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub classification: Classification,
    pub target: String,
    pub payload: Option<String>,
    pub user_agent: String,
    pub method: http::Method,
    pub category: String,
    pub referer: Option<String>,
}

impl WorkItem {
    pub(crate) fn plan<R: Rng + ?Sized>(
        classifier: &TrafficClassifier,
        catalog: &PayloadCatalog,
        user_agents: &[String],
        referer_probability: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let classification = classifier.classify(rng);
        let resolved = catalog.resolve_target(classification, rng)?;

        let user_agent = pick_user_agent(user_agents, classification.class(), rng);
        let referer = if rng.random_bool(referer_probability) {
            catalog.random_site(rng).map(|s| s.url.clone())
        } else {
            None
        };
        let method = if resolved.payload.is_some() {
            http::Method::POST
        } else {
            http::Method::GET
        };

        Ok(Self {
            classification,
            target: resolved.url,
            payload: resolved.payload,
            user_agent,
            method,
            category: resolved.category,
            referer,
        })
    }

    pub fn class(&self) -> TrafficClass {
        self.classification.class()
    }

    pub fn subtype(&self) -> Option<&'static str> {
        self.classification.subtype()
    }
}

fn pick_user_agent<R: Rng + ?Sized>(agents: &[String], class: TrafficClass, rng: &mut R) -> String {
    let pool = if class == TrafficClass::Compromised
        && agents.len() > LEGACY_AGENTS
        && rng.random_bool(LEGACY_AGENT_PROBABILITY)
    {
        &agents[agents.len() - LEGACY_AGENTS..]
    } else {
        agents
    };

    pool.choose(rng).cloned().unwrap_or_default()
}
