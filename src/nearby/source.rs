use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::RefreshConfig;
use crate::core::geo::LatLng;
use crate::nearby::item::NearbyItem;
use crate::traits::NearbySource;
use crate::{PostmapError, Result};

/// Stand-in for a real spatial query: scatters a fixed number of
/// postcards uniformly inside a box of `±jitter_degrees` around the center.
pub struct RandomNearbySource {
    config: RefreshConfig,
    rng: Mutex<StdRng>,
}

impl RandomNearbySource {
    pub fn new(config: RefreshConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic variant for tests and demos
    pub fn seeded(config: RefreshConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    fn generate(&self, center: LatLng) -> Result<Vec<NearbyItem>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| PostmapError::RefreshFailed("random source poisoned".to_string()))?;

        let jitter = self.config.jitter_degrees;
        let count = self.config.batch_size.min(self.config.max_items);
        let now = Utc::now();

        let items = (0..count)
            .map(|_| {
                let coordinate = LatLng::new(
                    center.lat + rng.gen_range(-jitter..=jitter),
                    center.lng + rng.gen_range(-jitter..=jitter),
                )
                .normalized();
                let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
                NearbyItem {
                    id: id.to_string(),
                    label: self.config.label.clone(),
                    image_url: self.config.image_url.clone(),
                    timestamp: now,
                    coordinate,
                }
            })
            .collect();

        Ok(items)
    }
}

impl Default for RandomNearbySource {
    fn default() -> Self {
        Self::new(RefreshConfig::default())
    }
}

#[async_trait]
impl NearbySource for RandomNearbySource {
    async fn nearby(&self, center: LatLng) -> Result<Vec<NearbyItem>> {
        log::debug!("Synthesizing nearby postcards around {:?}", center);
        self.generate(center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_stay_inside_jitter_box() {
        let source = RandomNearbySource::seeded(RefreshConfig::default(), 7);
        let center = LatLng::new(37.7749, -122.4194);

        let items = futures::executor::block_on(source.nearby(center)).unwrap();
        assert_eq!(items.len(), 5);
        for item in &items {
            assert!((item.coordinate.lat - center.lat).abs() <= 0.05 + 1e-12);
            assert!((item.coordinate.lng - center.lng).abs() <= 0.05 + 1e-12);
            assert_eq!(item.label, "Nearby Location");
            assert_eq!(item.image_url, "https://example.com/postcard.jpg");
        }
    }

    #[test]
    fn test_seeded_sources_agree() {
        let center = LatLng::new(48.8566, 2.3522);
        let a = RandomNearbySource::seeded(RefreshConfig::default(), 42);
        let b = RandomNearbySource::seeded(RefreshConfig::default(), 42);

        let first = futures::executor::block_on(a.nearby(center)).unwrap();
        let second = futures::executor::block_on(b.nearby(center)).unwrap();
        let coords = |items: &[NearbyItem]| {
            items
                .iter()
                .map(|i| (i.id.clone(), i.coordinate))
                .collect::<Vec<_>>()
        };
        assert_eq!(coords(&first), coords(&second));
    }

    #[test]
    fn test_batch_is_bounded_by_max_items() {
        let config = RefreshConfig {
            batch_size: 500,
            max_items: 8,
            ..RefreshConfig::default()
        };
        let source = RandomNearbySource::seeded(config, 1);
        let items = futures::executor::block_on(source.nearby(LatLng::new(0.0, 0.0))).unwrap();
        assert_eq!(items.len(), 8);
    }

    #[test]
    fn test_items_near_antimeridian_are_normalized() {
        let source = RandomNearbySource::seeded(RefreshConfig::default(), 3);
        let items = futures::executor::block_on(source.nearby(LatLng::new(0.0, 179.99))).unwrap();
        assert!(items.iter().all(|item| item.coordinate.is_valid()));
    }
}
