// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use solus_core::governor::{Constructible, GovernorError, PolicyRegistry, SingletonPolicy};
use solus_core::worker::{PeriodicWorker, WorkerConfig};
use solus_telemetry::tracker::{TimeFormat, TimeTracker, TrackerConfig, Verbosity};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A device that must exist at most once.
struct AudioMixer {
    channels: u32,
}

impl Constructible for AudioMixer {
    type Args = u32;

    fn allocate(channels: &u32) -> Result<Self> {
        Ok(Self {
            channels: *channels,
        })
    }

    fn initialize(&self, _: &u32) -> Result<()> {
        log::info!("AudioMixer opened with {} channels", self.channels);
        Ok(())
    }

    fn teardown(&self) {
        log::info!("AudioMixer closed");
    }
}

/// A cache shared by everyone who asks for it, warmed up only once.
struct AssetCache {
    warmed: AtomicU64,
}

impl Constructible for AssetCache {
    type Args = ();

    fn allocate(_: &()) -> Result<Self> {
        Ok(Self {
            warmed: AtomicU64::new(0),
        })
    }

    fn initialize(&self, _: &()) -> Result<()> {
        thread::sleep(Duration::from_millis(20));
        self.warmed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Heartbeat {
    beats: AtomicU64,
}

fn main() -> Result<()> {
    solus_telemetry::logging::init();

    let registry = PolicyRegistry::global();
    let mixers = registry.attach::<AudioMixer>(SingletonPolicy::Hard)?;
    let caches = registry.attach::<AssetCache>(SingletonPolicy::SoftSkipInit)?;

    let mut tracker = TimeTracker::from_config(TrackerConfig {
        format: TimeFormat::Ms,
        verbosity: Verbosity::Detailed,
        rounding: 3,
    })?;

    let heartbeat = Arc::new(Heartbeat {
        beats: AtomicU64::new(0),
    });
    let mut worker = PeriodicWorker::new(WorkerConfig {
        name: "sandbox-heartbeat".to_string(),
        interval: Duration::from_millis(25),
    });
    worker.start_with_target(&heartbeat, |hb: &Heartbeat| {
        let beat = hb.beats.fetch_add(1, Ordering::Relaxed) + 1;
        log::trace!("heartbeat #{}", beat);
    })?;

    {
        let _scope = tracker.scope();
        let mixer = mixers.construct(&2)?;
        match mixers.construct(&8) {
            Err(GovernorError::DuplicateInstance { .. }) => {
                log::info!("Second mixer refused while the first is alive");
            }
            other => anyhow::bail!("unexpected result for a second mixer: {:?}", other.err()),
        }
        drop(mixer);
        let reopened = mixers.construct(&8)?;
        log::info!("Mixer reopened with {} channels", reopened.channels);
    }

    {
        let _scope = tracker.scope();
        let first = caches.construct(&())?;
        let second = caches.construct(&())?;
        log::info!(
            "Asset cache shared: {}, warmed {} time(s)",
            solus_core::Instance::ptr_eq(&first, &second),
            second.warmed.load(Ordering::SeqCst)
        );
    }

    for (type_key, policy) in registry.governed_types() {
        log::info!("{} is governed by the {} policy", type_key, policy);
    }

    thread::sleep(Duration::from_millis(100));
    log::info!(
        "Heartbeat ticked {} time(s) over {}",
        heartbeat.beats.load(Ordering::Relaxed),
        tracker.to_string().trim_end()
    );
    drop(heartbeat);
    worker.stop();
    Ok(())
}
