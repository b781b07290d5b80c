//! Local task spawning on the browser microtask queue.

use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};

#[derive(Debug, Clone, Copy, Default)]
/// Spawner backed by `wasm_bindgen_futures::spawn_local`.
pub struct WebLocalSpawner;

impl LocalSpawn for WebLocalSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(future);
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            drop(future);
            Err(SpawnError::shutdown())
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::task::LocalSpawnExt;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_spawner_reports_shutdown() {
        let err = WebLocalSpawner
            .spawn_local(async {})
            .expect_err("native spawn should fail");
        assert!(err.is_shutdown());
    }
}
