//! Measurement Submitter
//!
//! Requests one paired (traceroute, DNS) one-off measurement per logical
//! source that the ID store does not already track.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::MeasurementConfig;
use crate::platform::{
    CreateRequest, DnsSpec, MeasurementDefinition, MeasurementPlatform, ProbeSource,
    TracerouteSpec,
};
use crate::store::{IdStore, MeasurementPair};

/// Fixed parameters shared by every submission in a run
#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    pub anchor: String,
    pub anchor_name: String,
    pub address_family: u8,
    pub probes_requested: u32,
    pub source_type: String,
    pub traceroute_protocol: String,
    pub query_argument: String,
    pub query_type: String,
    pub query_class: String,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self::from(&MeasurementConfig::default())
    }
}

impl From<&MeasurementConfig> for SubmitterConfig {
    fn from(m: &MeasurementConfig) -> Self {
        Self {
            anchor: m.anchor.clone(),
            anchor_name: m.anchor_name.clone(),
            address_family: m.address_family,
            probes_requested: m.probes_requested,
            source_type: m.source_type.clone(),
            traceroute_protocol: m.traceroute_protocol.clone(),
            query_argument: m.query_argument.clone(),
            query_type: m.query_type.clone(),
            query_class: m.query_class.clone(),
        }
    }
}

/// What happened to each source during one `create_all` run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

pub struct MeasurementSubmitter<'a, P> {
    platform: &'a P,
    config: SubmitterConfig,
}

impl<'a, P: MeasurementPlatform> MeasurementSubmitter<'a, P> {
    pub fn new(platform: &'a P, config: SubmitterConfig) -> Self {
        Self { platform, config }
    }

    /// Build the combined request for one source
    pub fn request_for(&self, source: &str) -> CreateRequest {
        let c = &self.config;
        let traceroute = TracerouteSpec {
            af: c.address_family,
            target: c.anchor.clone(),
            protocol: c.traceroute_protocol.clone(),
            description: format!("Traceroute from {} to {}", source, c.anchor_name),
        };
        let dns = DnsSpec {
            af: c.address_family,
            target: c.anchor.clone(),
            query_argument: c.query_argument.clone(),
            query_type: c.query_type.clone(),
            query_class: c.query_class.clone(),
            description: format!("DNS response time from {} to {}", source, c.anchor_name),
        };

        CreateRequest {
            definitions: vec![
                MeasurementDefinition::Traceroute(traceroute),
                MeasurementDefinition::Dns(dns),
            ],
            probes: vec![ProbeSource {
                kind: c.source_type.clone(),
                value: source.to_string(),
                requested: c.probes_requested,
            }],
            is_oneoff: true,
            start_time: Some(Utc::now().timestamp()),
        }
    }

    /// Submit one source; `None` if the platform refused or answered oddly
    async fn create_measurement(&self, source: &str) -> Option<MeasurementPair> {
        let request = self.request_for(source);
        match self.platform.submit(&request).await {
            Ok(ids) => match ids.as_slice() {
                [traceroute_id, dns_id, ..] => {
                    info!("Created measurement for {}", source);
                    Some(MeasurementPair::new(*traceroute_id, *dns_id))
                }
                _ => {
                    warn!(
                        "Failed to create measurement for {}: expected 2 ids, got {:?}",
                        source, ids
                    );
                    None
                }
            },
            Err(e) => {
                warn!("Failed to create measurement for {}: {}", source, e);
                None
            }
        }
    }

    /// Create measurements for every untracked source, in order.
    ///
    /// Existing entries are never touched; failed sources stay absent and are
    /// retried on the next run.
    pub async fn create_all(&self, sources: &[String], existing: IdStore) -> IdStore {
        self.create_all_with_report(sources, existing).await.0
    }

    pub async fn create_all_with_report(
        &self,
        sources: &[String],
        mut ids: IdStore,
    ) -> (IdStore, CreateReport) {
        let mut report = CreateReport::default();

        for source in sources {
            if ids.contains(source) {
                info!("Measurement for {} already exists", source);
                report.skipped.push(source.clone());
                continue;
            }

            match self.create_measurement(source).await {
                Some(pair) => {
                    ids.insert_new(source.clone(), pair);
                    report.created.push(source.clone());
                }
                None => report.failed.push(source.clone()),
            }
        }

        info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Create run finished"
        );
        (ids, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakePlatform;

    fn sources(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_creates_in_order() {
        let platform = FakePlatform::new();
        let submitter = MeasurementSubmitter::new(&platform, SubmitterConfig::default());

        let ids = submitter
            .create_all(&sources(&["UZ", "UA", "TM"]), IdStore::new())
            .await;

        assert_eq!(ids.sources().collect::<Vec<_>>(), vec!["UZ", "UA", "TM"]);
        assert_eq!(ids.get("UZ"), Some(MeasurementPair::new(100, 101)));
        assert_eq!(ids.get("TM"), Some(MeasurementPair::new(104, 105)));
        assert_eq!(platform.submissions(), 3);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let platform = FakePlatform::new();
        let submitter = MeasurementSubmitter::new(&platform, SubmitterConfig::default());
        let list = sources(&["KZ", "KG", "GE"]);

        let first = submitter.create_all(&list, IdStore::new()).await;
        assert_eq!(platform.submissions(), 3);

        let (second, report) = submitter.create_all_with_report(&list, first.clone()).await;
        assert_eq!(platform.submissions(), 3);
        assert_eq!(second, first);
        assert!(report.created.is_empty());
        assert_eq!(report.skipped, list);
    }

    #[tokio::test]
    async fn test_existing_entries_preserved() {
        let platform = FakePlatform::new();
        let submitter = MeasurementSubmitter::new(&platform, SubmitterConfig::default());

        let mut existing = IdStore::new();
        existing.insert_new("EE", MeasurementPair::new(1, 2));
        existing.insert_new("XX", MeasurementPair::new(3, 4));

        let ids = submitter
            .create_all(&sources(&["BY", "EE"]), existing)
            .await;

        assert_eq!(ids.sources().collect::<Vec<_>>(), vec!["EE", "XX", "BY"]);
        assert_eq!(ids.get("EE"), Some(MeasurementPair::new(1, 2)));
        assert_eq!(ids.get("XX"), Some(MeasurementPair::new(3, 4)));
        assert_eq!(platform.submissions(), 1);
    }

    #[tokio::test]
    async fn test_failed_source_left_absent() {
        let mut platform = FakePlatform::new();
        platform.refuse = vec!["AZ"];
        let submitter = MeasurementSubmitter::new(&platform, SubmitterConfig::default());

        let (ids, report) = submitter
            .create_all_with_report(&sources(&["AZ", "AM"]), IdStore::new())
            .await;

        assert!(!ids.contains("AZ"));
        assert!(ids.contains("AM"));
        assert_eq!(report.failed, vec!["AZ".to_string()]);
        assert_eq!(report.created, vec!["AM".to_string()]);
    }

    #[tokio::test]
    async fn test_short_reply_is_failure() {
        let mut platform = FakePlatform::new();
        platform.short_reply = true;
        let submitter = MeasurementSubmitter::new(&platform, SubmitterConfig::default());

        let ids = submitter.create_all(&sources(&["LV"]), IdStore::new()).await;
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_source_submitted_once() {
        let platform = FakePlatform::new();
        let submitter = MeasurementSubmitter::new(&platform, SubmitterConfig::default());

        let ids = submitter
            .create_all(&sources(&["RU", "RU"]), IdStore::new())
            .await;
        assert_eq!(ids.len(), 1);
        assert_eq!(platform.submissions(), 1);
    }

    #[test]
    fn test_request_targets_anchor() {
        let platform = FakePlatform::new();
        let submitter = MeasurementSubmitter::new(&platform, SubmitterConfig::default());
        let request = submitter.request_for("TJ");

        assert!(request.is_oneoff);
        assert!(request.start_time.is_some());
        assert_eq!(request.probes[0].requested, 50);
        assert_eq!(request.probes[0].kind, "country");
        assert_eq!(request.probes[0].value, "TJ");
        match &request.definitions[..] {
            [MeasurementDefinition::Traceroute(t), MeasurementDefinition::Dns(d)] => {
                assert_eq!(t.target, "193.0.14.129");
                assert_eq!(d.target, "193.0.14.129");
                assert_eq!(t.description, "Traceroute from TJ to K Root");
                assert_eq!(d.query_argument, "com.");
            }
            other => panic!("unexpected definitions: {:?}", other),
        }
    }
}
