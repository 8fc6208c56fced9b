// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup and recording doubles for the upgrade collaborators.

use async_trait::async_trait;
use elevate::endpoint::{
    Endpoint, EndpointId, EndpointStore, EndpointType, MemoryEndpointStore, StoreError,
};
use elevate::platform::{ContainerEngine, DetectionError, Platform, PlatformDetector};
use elevate::types::LicenseKey;
use elevate::upgrade::{StrategyError, SystemUpgrade, UpgradeCoordinator, UpgradeStrategy};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("elevate=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// One recorded strategy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub endpoint: EndpointId,
    pub license: String,
    pub version: String,
}

/// Strategy that records its calls and returns a fixed outcome.
#[derive(Default)]
pub struct RecordingStrategy {
    calls: Mutex<Vec<RecordedCall>>,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingStrategy {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl UpgradeStrategy for RecordingStrategy {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn upgrade(
        &self,
        endpoint: &Endpoint,
        license: &LicenseKey,
        version: &str,
    ) -> Result<(), StrategyError> {
        self.calls.lock().push(RecordedCall {
            endpoint: endpoint.id,
            license: license.as_str().to_string(),
            version: version.to_string(),
        });
        // Keep the dispatch in flight long enough for concurrent callers to collide.
        tokio::task::yield_now().await;

        if self.fail {
            Err(StrategyError::launch("engine unreachable"))
        } else {
            Ok(())
        }
    }
}

/// Detector with a fixed answer that counts how often it is asked.
pub struct CountingDetector {
    result: Result<Platform, DetectionError>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingDetector {
    pub fn new(result: Result<Platform, DetectionError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PlatformDetector for CountingDetector {
    fn determine_container_platform(&self) -> Result<Platform, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
    }
}

/// In-memory store that counts list calls.
pub struct CountingStore {
    inner: MemoryEndpointStore,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingStore {
    pub fn new(endpoints: Vec<Endpoint>) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryEndpointStore::new(endpoints),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EndpointStore for CountingStore {
    async fn list_endpoints(&self) -> Result<Vec<Endpoint>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_endpoints().await
    }
}

#[allow(dead_code)]
pub fn endpoint(id: u32, endpoint_type: EndpointType, engine: Option<ContainerEngine>) -> Endpoint {
    Endpoint {
        id: EndpointId(id),
        name: format!("endpoint-{id}"),
        endpoint_type,
        url: String::new(),
        container_engine: engine,
    }
}

/// A wired system plus handles on every double.
#[allow(dead_code)]
pub struct Harness {
    pub system: SystemUpgrade,
    pub detector: Arc<CountingDetector>,
    pub store: Arc<CountingStore>,
    pub docker: Arc<RecordingStrategy>,
    pub kubernetes: Arc<RecordingStrategy>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(platform: Platform, endpoints: Vec<Endpoint>) -> Self {
        Self::with_strategies(
            platform,
            endpoints,
            RecordingStrategy::new(),
            RecordingStrategy::new(),
        )
    }

    pub fn with_strategies(
        platform: Platform,
        endpoints: Vec<Endpoint>,
        docker: Arc<RecordingStrategy>,
        kubernetes: Arc<RecordingStrategy>,
    ) -> Self {
        let detected = match platform {
            Platform::Unknown => Err(DetectionError::NoSignal),
            known => Ok(known),
        };
        let detector = CountingDetector::new(detected);
        let store = CountingStore::new(endpoints);
        let coordinator = Arc::new(UpgradeCoordinator::new(
            platform,
            "2.21.0",
            docker.clone(),
            kubernetes.clone(),
        ));
        let system = SystemUpgrade::new(detector.clone(), store.clone(), coordinator);

        Self {
            system,
            detector,
            store,
            docker,
            kubernetes,
        }
    }
}
