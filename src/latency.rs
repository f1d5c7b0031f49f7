use anyhow::{anyhow, Result};
use std::time::{Duration, Instant};

/// Static images hosted in one storage account per region
const DEFAULT_TARGETS: &[(&str, &str)] = &[
    (
        "East US",
        "https://gallerylatencyeastus.blob.core.windows.net/static/probe.jpg",
    ),
    (
        "West Europe",
        "https://gallerylatencywesteu.blob.core.windows.net/static/probe.jpg",
    ),
    (
        "Southeast Asia",
        "https://gallerylatencyseasia.blob.core.windows.net/static/probe.jpg",
    ),
    (
        "Australia East",
        "https://gallerylatencyaueast.blob.core.windows.net/static/probe.jpg",
    ),
];

/// Timing of one GET against a region's probe URL
#[derive(Debug, Clone)]
pub struct LatencySample {
    pub region: String,
    pub url: String,
    /// Elapsed seconds rounded to milliseconds, `None` when the request failed
    pub seconds: Option<f64>,
}

/// Times a GET of a fixed image in each configured region
pub struct LatencyProbe {
    client: reqwest::Client,
    targets: Vec<(String, String)>,
}

impl LatencyProbe {
    pub fn new(targets: Option<Vec<(String, String)>>) -> Self {
        let targets = targets.unwrap_or_else(|| {
            DEFAULT_TARGETS
                .iter()
                .map(|(region, url)| (region.to_string(), url.to_string()))
                .collect()
        });

        LatencyProbe {
            client: reqwest::Client::new(),
            targets,
        }
    }

    pub fn targets(&self) -> &[(String, String)] {
        &self.targets
    }

    /// Probe every target in order, one request at a time
    pub async fn measure(&self) -> Vec<LatencySample> {
        let mut samples = Vec::with_capacity(self.targets.len());

        for (region, url) in &self.targets {
            let seconds = match self.time_get(url).await {
                Ok(elapsed) => Some(round_seconds(elapsed)),
                Err(e) => {
                    tracing::warn!("Latency probe for {} failed: {}", region, e);
                    None
                }
            };

            samples.push(LatencySample {
                region: region.clone(),
                url: url.clone(),
                seconds,
            });
        }

        samples
    }

    /// Wall-clock time to fetch the whole response body
    async fn time_get(&self, url: &str) -> Result<Duration> {
        let started = Instant::now();

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP {} from {}", response.status(), url));
        }
        response
            .bytes()
            .await
            .map_err(|e| anyhow!("Failed to read probe body: {}", e))?;

        Ok(started.elapsed())
    }
}

/// Seconds rounded to three decimals
pub fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_seconds() {
        assert_eq!(round_seconds(Duration::from_micros(1_234_567)), 1.235);
        assert_eq!(round_seconds(Duration::from_millis(42)), 0.042);
        assert_eq!(round_seconds(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_default_targets_used_when_unset() {
        let probe = LatencyProbe::new(None);
        assert_eq!(probe.targets().len(), DEFAULT_TARGETS.len());
        assert_eq!(probe.targets()[0].0, "East US");
    }

    #[tokio::test]
    async fn test_unreachable_target_reports_none_and_continues() {
        let probe = LatencyProbe::new(Some(vec![
            ("nowhere".to_string(), "http://127.0.0.1:1/probe.jpg".to_string()),
            ("bad-url".to_string(), "not a url".to_string()),
        ]));

        let samples = probe.measure().await;

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].region, "nowhere");
        assert!(samples.iter().all(|s| s.seconds.is_none()));
    }
}
