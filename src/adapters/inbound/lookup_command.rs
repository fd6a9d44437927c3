//! Lookup command
//!
//! Resolves a batch of IPs from the command line and renders a per-IP
//! report followed by a summary table.

use crate::application::LocationService;
use crate::domain::entities::LocationResult;
use std::io::{self, Write};

/// Results of one batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct LookupReport {
    pub entries: Vec<(String, LocationResult)>,
}

/// Resolve every IP sequentially.
///
/// With `provider` set only that provider is asked, with its configured
/// credentials; otherwise the service's default fallback order is used.
pub async fn run_lookup(
    service: &LocationService,
    ips: &[String],
    provider: Option<&str>,
) -> LookupReport {
    let mut entries = Vec::with_capacity(ips.len());

    for ip in ips {
        tracing::info!("looking up IP: {}", ip);
        let result = match provider {
            Some(name) => {
                let params = service.credentials_for(name);
                service.resolve(ip, name, &params).await
            }
            None => service.resolve_with_default_fallback(ip).await,
        };
        entries.push((ip.clone(), result));
    }

    LookupReport { entries }
}

impl LookupReport {
    /// Number of IPs that got a location.
    pub fn located(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_success()).count()
    }

    /// Human-readable report.
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (ip, result) in &self.entries {
            writeln!(out, "Looking up {}", ip)?;
            if result.is_success() {
                let provider = result.provider_used.or(result.provider);
                writeln!(out, "  provider:  {}", display(provider))?;
                writeln!(
                    out,
                    "  location:  {}, {}",
                    display(result.latitude),
                    display(result.longitude)
                )?;
                writeln!(out, "  city:      {}", display(result.city.as_deref()))?;
                writeln!(out, "  country:   {}", display(result.country.as_deref()))?;
                writeln!(out, "  timezone:  {}", display(result.timezone.as_deref()))?;
            } else {
                writeln!(out, "  error:     {}", error_of(result))?;
            }
            writeln!(out)?;
        }

        writeln!(
            out,
            "Summary ({} of {} located)",
            self.located(),
            self.entries.len()
        )?;
        for (ip, result) in &self.entries {
            match (result.is_success(), result.latitude, result.longitude) {
                (true, Some(lat), Some(lon)) => writeln!(
                    out,
                    "  {:15} -> {:15} {:20} ({:.2}, {:.2})",
                    ip,
                    display(result.city.as_deref()),
                    display(result.country.as_deref()),
                    lat,
                    lon
                )?,
                _ => writeln!(out, "  {:15} -> error: {}", ip, error_of(result))?,
            }
        }
        Ok(())
    }

    /// Results as a JSON array of location records.
    pub fn write_json<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let results: Vec<&LocationResult> = self.entries.iter().map(|(_, r)| r).collect();
        serde_json::to_writer_pretty(&mut *out, &results)?;
        writeln!(out)
    }
}

fn display<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn error_of(result: &LocationResult) -> &str {
    result.error.as_deref().unwrap_or("Location data not available")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::application::ProviderRegistry;
    use crate::domain::errors::ProviderError;
    use crate::domain::ports::LocationProvider;
    use crate::domain::value_objects::{ProviderKind, ProviderParams};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Locates only `known`, recording each call.
    struct TableProvider {
        kind: ProviderKind,
        known: &'static str,
        calls: Mutex<Vec<(String, ProviderParams)>>,
    }

    impl TableProvider {
        fn new(kind: ProviderKind, known: &'static str) -> Arc<Self> {
            Arc::new(Self {
                kind,
                known,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LocationProvider for TableProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn locate(
            &self,
            ip: &str,
            params: &ProviderParams,
        ) -> Result<LocationResult, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push((ip.to_string(), params.clone()));
            if ip == self.known {
                Ok(LocationResult {
                    city: Some("Mountain View".to_string()),
                    country: Some("United States".to_string()),
                    timezone: Some("America/Los_Angeles".to_string()),
                    ..LocationResult::located(ip, self.kind, 37.4, -122.0)
                })
            } else {
                Err(ProviderError::Rejected {
                    provider: self.kind,
                    message: "reserved range".to_string(),
                })
            }
        }
    }

    fn service(providers: Vec<Arc<dyn LocationProvider>>) -> LocationService {
        LocationService::new(ProviderRegistry::new(providers)).with_fallback_delay(Duration::ZERO)
    }

    fn ips(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_lookup_uses_fallback() {
        let ip_api = TableProvider::new(ProviderKind::IpApi, "1.1.1.1");
        let ipinfo = TableProvider::new(ProviderKind::IpInfo, "8.8.8.8");
        let svc = service(vec![ip_api.clone(), ipinfo.clone()]);

        let report = run_lookup(&svc, &ips(&["8.8.8.8", "10.0.0.1"]), None).await;

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.located(), 1);
        assert_eq!(report.entries[0].0, "8.8.8.8");
        assert_eq!(report.entries[0].1.provider_used, Some(ProviderKind::IpInfo));
        assert_eq!(
            report.entries[1].1.error.as_deref(),
            Some("All providers failed")
        );
    }

    #[tokio::test]
    async fn test_run_lookup_single_provider_with_credentials() {
        let ip_api = TableProvider::new(ProviderKind::IpApi, "8.8.8.8");
        let ipinfo = TableProvider::new(ProviderKind::IpInfo, "8.8.8.8");
        let svc = service(vec![ip_api.clone(), ipinfo.clone()])
            .with_credentials(ProviderKind::IpInfo, ProviderParams::with_api_key("tok"));

        let report = run_lookup(&svc, &ips(&["8.8.8.8"]), Some("ipinfo")).await;

        assert_eq!(report.located(), 1);
        assert_eq!(report.entries[0].1.provider, Some(ProviderKind::IpInfo));
        assert!(ip_api.calls.lock().unwrap().is_empty());
        assert_eq!(
            ipinfo.calls.lock().unwrap()[0],
            ("8.8.8.8".to_string(), ProviderParams::with_api_key("tok"))
        );
    }

    #[tokio::test]
    async fn test_run_lookup_unknown_provider() {
        let svc = service(vec![]);
        let report = run_lookup(&svc, &ips(&["8.8.8.8"]), Some("nonexistent")).await;

        assert_eq!(report.located(), 0);
        assert_eq!(
            report.entries[0].1.error.as_deref(),
            Some("Unknown provider: nonexistent")
        );
    }

    #[tokio::test]
    async fn test_write_text_report() {
        let ip_api = TableProvider::new(ProviderKind::IpApi, "8.8.8.8");
        let svc = service(vec![ip_api]);
        let report = run_lookup(&svc, &ips(&["8.8.8.8", "10.0.0.1"]), Some("ip-api")).await;

        let mut out = Vec::new();
        report.write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Looking up 8.8.8.8"));
        assert!(text.contains("  provider:  ip-api"));
        assert!(text.contains("  location:  37.4, -122"));
        assert!(text.contains("  city:      Mountain View"));
        assert!(text.contains("  timezone:  America/Los_Angeles"));
        assert!(text.contains("  error:     IP-API error: reserved range"));
        assert!(text.contains("Summary (1 of 2 located)"));
        assert!(text.contains("(37.40, -122.00)"));
        assert!(text.contains("10.0.0.1        -> error: IP-API error: reserved range"));
    }

    #[tokio::test]
    async fn test_write_json_report() {
        let ip_api = TableProvider::new(ProviderKind::IpApi, "8.8.8.8");
        let svc = service(vec![ip_api]);
        let report = run_lookup(&svc, &ips(&["8.8.8.8"]), Some("ip-api")).await;

        let mut out = Vec::new();
        report.write_json(&mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(json[0]["ip"], "8.8.8.8");
        assert_eq!(json[0]["provider"], "ip-api");
        assert_eq!(json[0]["latitude"], 37.4);
    }
}
