use std::collections::BTreeMap;

use rand::Rng;
use rand::distr::Distribution as _;
use rand::distr::weighted::WeightedIndex;
use rand::seq::IndexedRandom as _;

use crate::classify::{AttackKind, Behavior, ClassPolicy, Classification, TrafficClass};
use crate::error::{Error, Result};

mod builtin;

const SUBPAGES: &[&str] = &[
    "/about", "/contact", "/help", "/privacy", "/terms", "/products", "/services", "/blog",
    "/news",
];
const SEARCH_TERMS: &[&str] = &["news", "products", "services", "help", "contact"];

const CREDENTIAL_PATHS: &[&str] = &["login", "signin", "auth", "password"];
const EXFILTRATION_PATHS: &[&str] = &["upload", "transfer", "sync", "backup"];
const LATERAL_PATHS: &[&str] = &["admin", "internal", "management", "control"];
const PERSISTENCE_PATHS: &[&str] = &["config", "settings", "startup", "service"];
const C2_COMMANDS: &[&str] = &["heartbeat", "get_tasks", "send_data"];

const ROOT_SHARE: f64 = 0.60;
const SUBPAGE_SHARE: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub url: String,
    pub category: String,
}

impl Site {
    pub fn new(url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: category.into(),
        }
    }
}

/// Raw site and payload data, loaded once per session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogData {
    pub sites: Vec<Site>,
    /// Relative weight per site category; categories without an entry weigh 1.
    pub category_weights: BTreeMap<String, u32>,
    pub attack_payloads: BTreeMap<AttackKind, Vec<String>>,
    /// Base URLs that receive malicious requests.
    pub attack_targets: Vec<String>,
    /// Hosts (optionally with port) that receive C2 beacons.
    pub c2_domains: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

pub fn builtin_user_agents() -> Vec<String> {
    owned(builtin::USER_AGENTS)
}

impl CatalogData {
    pub fn builtin() -> Self {
        let attack_payloads = BTreeMap::from([
            (AttackKind::SqlInjection, owned(builtin::SQL_INJECTION)),
            (AttackKind::Xss, owned(builtin::XSS)),
            (AttackKind::PathTraversal, owned(builtin::PATH_TRAVERSAL)),
            (AttackKind::CommandInjection, owned(builtin::COMMAND_INJECTION)),
        ]);

        Self {
            sites: builtin::SITES
                .iter()
                .map(|(url, category)| Site::new(*url, *category))
                .collect(),
            category_weights: builtin::CATEGORY_WEIGHTS
                .iter()
                .map(|(c, w)| ((*c).to_string(), *w))
                .collect(),
            attack_payloads,
            attack_targets: owned(builtin::ATTACK_TARGETS),
            c2_domains: owned(builtin::C2_DOMAINS),
        }
    }

    #[must_use]
    pub fn with_sites(mut self, sites: Vec<Site>) -> Self {
        self.sites = sites;
        self
    }

    fn weight_of(&self, site: &Site) -> u32 {
        self.category_weights
            .get(&site.category)
            .copied()
            .unwrap_or(1)
    }
}

/// Where a work item goes and what it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub url: String,
    pub payload: Option<String>,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct PayloadCatalog {
    data: CatalogData,
    site_index: Option<WeightedIndex<u32>>,
}

impl PayloadCatalog {
    pub fn new(data: CatalogData) -> Self {
        // All-zero or empty weights leave no index; normal lookups then report exhaustion.
        let site_index = WeightedIndex::new(data.sites.iter().map(|s| data.weight_of(s))).ok();
        Self { data, site_index }
    }

    pub fn sites(&self) -> &[Site] {
        &self.data.sites
    }

    /// Check that every list a session with `policy` can draw from is non-empty.
    pub fn validate(&self, policy: &ClassPolicy) -> Result<()> {
        if self.site_index.is_none() {
            return Err(exhausted(TrafficClass::Normal, "weighted sites"));
        }

        if policy.enable_compromise && policy.compromise_probability > 0.0 {
            self.require(TrafficClass::Compromised, "c2 domains", &self.data.c2_domains)?;
        }

        if policy.enable_malicious && policy.malicious_probability > 0.0 {
            self.require(
                TrafficClass::Malicious,
                "attack targets",
                &self.data.attack_targets,
            )?;
            for kind in AttackKind::ALL {
                self.payloads(kind)?;
            }
        }

        Ok(())
    }

    pub fn resolve_target<R: Rng + ?Sized>(
        &self,
        classification: Classification,
        rng: &mut R,
    ) -> Result<ResolvedTarget> {
        match classification {
            Classification::Normal => self.normal(rng),
            Classification::Compromised(behavior) => self.compromised(behavior, rng),
            Classification::Malicious(kind) => self.malicious(kind, rng),
        }
    }

    /// Any benign site, unweighted. Used for `Referer` headers and probes.
    pub fn random_site<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Site> {
        self.data.sites.choose(rng)
    }

    fn weighted_site<R: Rng + ?Sized>(&self, class: TrafficClass, rng: &mut R) -> Result<&Site> {
        let index = self
            .site_index
            .as_ref()
            .ok_or_else(|| exhausted(class, "weighted sites"))?;
        self.data
            .sites
            .get(index.sample(rng))
            .ok_or_else(|| exhausted(class, "weighted sites"))
    }

    fn normal<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ResolvedTarget> {
        let site = self.weighted_site(TrafficClass::Normal, rng)?;

        let r: f64 = rng.random();
        let url = if r < ROOT_SHARE {
            site.url.clone()
        } else if r < ROOT_SHARE + SUBPAGE_SHARE {
            let sub = SUBPAGES.choose(rng).copied().unwrap_or("/about");
            join(&site.url, sub)
        } else {
            let term = SEARCH_TERMS.choose(rng).copied().unwrap_or("news");
            join(&site.url, &format!("/search?q={term}"))
        };

        Ok(ResolvedTarget {
            url,
            payload: None,
            category: site.category.clone(),
        })
    }

    fn compromised<R: Rng + ?Sized>(
        &self,
        behavior: Behavior,
        rng: &mut R,
    ) -> Result<ResolvedTarget> {
        let marker = uuid::Uuid::new_v4();

        if behavior == Behavior::C2Beacon {
            let domain = self
                .data
                .c2_domains
                .choose(rng)
                .ok_or_else(|| exhausted(TrafficClass::Compromised, "c2 domains"))?;
            let command = C2_COMMANDS
                .choose(rng)
                .copied()
                .unwrap_or("heartbeat");
            return Ok(ResolvedTarget {
                url: format!("http://{domain}/api/client"),
                payload: Some(format!("sim_marker={marker}&command={command}")),
                category: "c2".to_string(),
            });
        }

        let (fragments, detail) = match behavior {
            Behavior::CredentialTheft => (
                CREDENTIAL_PATHS,
                "action=harvest_credentials&username=sim_user&password=SIMULATED".to_string(),
            ),
            Behavior::DataExfiltration => (
                EXFILTRATION_PATHS,
                format!(
                    "action=upload&file=documents.zip&size={}MB",
                    rng.random_range(1..=100u32)
                ),
            ),
            Behavior::LateralMovement => (
                LATERAL_PATHS,
                "action=enumerate&scope=internal".to_string(),
            ),
            Behavior::Persistence => (
                PERSISTENCE_PATHS,
                "action=register&service=sim_updater".to_string(),
            ),
            Behavior::C2Beacon => (CREDENTIAL_PATHS, String::new()),
        };

        let site = self.weighted_site(TrafficClass::Compromised, rng)?;
        let fragment = fragments.choose(rng).copied().unwrap_or("login");

        Ok(ResolvedTarget {
            url: join(&site.url, &format!("/{fragment}")),
            payload: Some(format!("sim_marker={marker}&{detail}")),
            category: site.category.clone(),
        })
    }

    fn malicious<R: Rng + ?Sized>(&self, kind: AttackKind, rng: &mut R) -> Result<ResolvedTarget> {
        let target = self
            .data
            .attack_targets
            .choose(rng)
            .ok_or_else(|| exhausted(TrafficClass::Malicious, "attack targets"))?;
        let payload = self
            .payloads(kind)?
            .choose(rng)
            .ok_or_else(|| exhausted(TrafficClass::Malicious, "attack payloads"))?;

        let fragments: &[&str] = match kind {
            AttackKind::SqlInjection => &["search", "login", "id", "query"],
            AttackKind::Xss => &["comment", "search", "input", "name"],
            AttackKind::PathTraversal => &["file", "path", "dir", "include"],
            AttackKind::CommandInjection => &["cmd", "exec", "system", "shell"],
        };
        let fragment = fragments.choose(rng).copied().unwrap_or("search");

        Ok(ResolvedTarget {
            url: join(target, &format!("/{fragment}")),
            payload: Some(payload.clone()),
            category: "attack".to_string(),
        })
    }

    fn payloads(&self, kind: AttackKind) -> Result<&[String]> {
        match self.data.attack_payloads.get(&kind) {
            Some(list) if !list.is_empty() => Ok(list),
            _ => Err(exhausted(TrafficClass::Malicious, "attack payloads")),
        }
    }

    fn require(&self, class: TrafficClass, what: &'static str, list: &[String]) -> Result<()> {
        if list.is_empty() {
            Err(exhausted(class, what))
        } else {
            Ok(())
        }
    }
}

fn exhausted(class: TrafficClass, what: &'static str) -> Error {
    Error::CatalogExhausted { class, what }
}

fn join(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}
