//! Configuration epics.
//!
//! `SET_CONFIG` triggers `SAVE_CONFIG`; `SAVE_CONFIG` and `LOAD_CONFIG` are
//! carried out against a [`ConfigPersistence`] and answered with a result
//! action.

use futures::future;
use futures::StreamExt;
use std::sync::Arc;

use cellkit_core::{Action, ActionStream, ConfigAction, ConfigPersistence};

use crate::epic::{Epic, EpicContext, EpicOutput};
use crate::error::EpicError;

/// Emit one `SAVE_CONFIG` for every `SET_CONFIG`, in order
///
/// No coalescing and no delay: a burst of changes produces a burst of saves.
pub fn save_config_on_change(actions: ActionStream) -> ActionStream {
    actions
        .filter_map(|action| {
            future::ready(match action {
                Action::Config(ConfigAction::SetConfig { .. }) => {
                    Some(Action::from(ConfigAction::SaveConfig))
                }
                _ => None,
            })
        })
        .boxed()
}

/// Requests a save whenever an option changes
#[derive(Debug, Default, Clone, Copy)]
pub struct SaveConfigOnChange;

impl Epic for SaveConfigOnChange {
    fn name(&self) -> &str {
        "save_config_on_change"
    }

    fn run(&self, actions: ActionStream, _ctx: &EpicContext) -> Result<EpicOutput, EpicError> {
        Ok(save_config_on_change(actions).map(Ok).boxed())
    }
}

/// Writes the live configuration on every `SAVE_CONFIG`
///
/// Saves run one at a time in request order.
pub struct SaveConfigEpic {
    persistence: Arc<dyn ConfigPersistence>,
}

impl SaveConfigEpic {
    pub fn new(persistence: Arc<dyn ConfigPersistence>) -> Self {
        Self { persistence }
    }
}

impl Epic for SaveConfigEpic {
    fn name(&self) -> &str {
        "save_config"
    }

    fn run(&self, actions: ActionStream, ctx: &EpicContext) -> Result<EpicOutput, EpicError> {
        let persistence = Arc::clone(&self.persistence);
        let state = ctx.state().clone();

        Ok(actions
            .filter(|action| {
                future::ready(matches!(action, Action::Config(ConfigAction::SaveConfig)))
            })
            .then(move |_| {
                let persistence = Arc::clone(&persistence);
                let config = state.state().config.clone();
                async move {
                    match persistence.save(&config).await {
                        Ok(()) => {
                            tracing::debug!("Saved {} config options", config.len());
                            ConfigAction::DoneSavingConfig
                        }
                        Err(err) => {
                            tracing::warn!("Failed to save config: {}", err);
                            ConfigAction::SaveConfigFailed {
                                error: err.to_string(),
                            }
                        }
                    }
                }
            })
            .map(|action| Ok(Action::from(action)))
            .boxed())
    }
}

/// Reads the stored configuration on every `LOAD_CONFIG`
pub struct LoadConfigEpic {
    persistence: Arc<dyn ConfigPersistence>,
}

impl LoadConfigEpic {
    pub fn new(persistence: Arc<dyn ConfigPersistence>) -> Self {
        Self { persistence }
    }
}

impl Epic for LoadConfigEpic {
    fn name(&self) -> &str {
        "load_config"
    }

    fn run(&self, actions: ActionStream, _ctx: &EpicContext) -> Result<EpicOutput, EpicError> {
        let persistence = Arc::clone(&self.persistence);

        Ok(actions
            .filter(|action| {
                future::ready(matches!(action, Action::Config(ConfigAction::LoadConfig)))
            })
            .then(move |_| {
                let persistence = Arc::clone(&persistence);
                async move {
                    match persistence.load().await {
                        Ok(config) => {
                            tracing::debug!("Loaded {} config options", config.len());
                            ConfigAction::MergeConfig { config }
                        }
                        Err(err) => {
                            tracing::warn!("Failed to load config: {}", err);
                            ConfigAction::LoadConfigFailed {
                                error: err.to_string(),
                            }
                        }
                    }
                }
            })
            .map(|action| Ok(Action::from(action)))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cellkit_core::{ActionBus, Config, PersistenceError, Store};
    use futures::stream;
    use parking_lot::Mutex;
    use serde_json::json;

    fn set_config(key: &str, value: serde_json::Value) -> Action {
        Action::from(ConfigAction::SetConfig {
            key: key.to_string(),
            value,
        })
    }

    async fn run_pure(inputs: Vec<Action>) -> Vec<Action> {
        save_config_on_change(stream::iter(inputs).boxed())
            .collect()
            .await
    }

    #[derive(Default)]
    struct RecordingPersistence {
        stored: Mutex<Option<Config>>,
        saves: Mutex<Vec<Config>>,
        fail_with: Option<PersistenceError>,
    }

    #[async_trait]
    impl ConfigPersistence for RecordingPersistence {
        async fn load(&self) -> Result<Config, PersistenceError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(self.stored.lock().clone().unwrap_or_default())
        }

        async fn save(&self, config: &Config) -> Result<(), PersistenceError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.saves.lock().push(config.clone());
            *self.stored.lock() = Some(config.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_single_set_config_yields_single_save() {
        let out = run_pure(vec![set_config("theme", json!("dark"))]).await;
        assert_eq!(out, vec![Action::from(ConfigAction::SaveConfig)]);
    }

    #[tokio::test]
    async fn test_burst_is_not_coalesced() {
        let out = run_pure(vec![
            set_config("theme", json!("dark")),
            set_config("theme", json!("light")),
        ])
        .await;
        assert_eq!(
            out,
            vec![
                Action::from(ConfigAction::SaveConfig),
                Action::from(ConfigAction::SaveConfig)
            ]
        );
    }

    #[tokio::test]
    async fn test_other_actions_are_ignored() {
        let out = run_pure(vec![
            Action::from(ConfigAction::LoadConfig),
            set_config("a", json!(1)),
            Action::from(ConfigAction::SaveConfig),
            set_config("b", json!(2)),
            Action::from(ConfigAction::DoneSavingConfig),
        ])
        .await;
        assert_eq!(out.len(), 2);
        assert!(out
            .iter()
            .all(|action| *action == Action::from(ConfigAction::SaveConfig)));
    }

    fn arbitrary_action(kind: u8, key: u8) -> Action {
        match kind % 4 {
            0 => set_config(&format!("key{}", key), json!(key)),
            1 => Action::from(ConfigAction::SaveConfig),
            2 => Action::from(ConfigAction::LoadConfig),
            _ => Action::from(ConfigAction::DoneSavingConfig),
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_one_save_per_set_config(
            inputs in proptest::collection::vec((0u8..4, 0u8..8), 0..64)
        ) {
            let actions: Vec<Action> = inputs
                .iter()
                .map(|(kind, key)| arbitrary_action(*kind, *key))
                .collect();
            let set_count = actions
                .iter()
                .filter(|action| action.tag() == "SET_CONFIG")
                .count();

            let out = futures::executor::block_on(run_pure(actions));
            proptest::prop_assert_eq!(out.len(), set_count);
            proptest::prop_assert!(out
                .iter()
                .all(|action| *action == Action::from(ConfigAction::SaveConfig)));
        }
    }

    #[tokio::test]
    async fn test_save_config_writes_live_config() {
        let bus = ActionBus::new();
        let store = Arc::new(Store::default());
        store.attach(&bus);
        bus.dispatch(set_config("theme", json!("dark")));

        let persistence = Arc::new(RecordingPersistence::default());
        let epic = SaveConfigEpic::new(persistence.clone());
        let ctx = EpicContext::new(store.reader());

        let inputs = stream::iter(vec![Action::from(ConfigAction::SaveConfig)]).boxed();
        let out: Vec<_> = epic.run(inputs, &ctx).expect("run").collect().await;

        assert_eq!(out, vec![Ok(Action::from(ConfigAction::DoneSavingConfig))]);
        let saves = persistence.saves.lock();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].get("theme"), Some(&json!("dark")));
    }

    #[tokio::test]
    async fn test_save_failure_is_reported_as_action() {
        let persistence = Arc::new(RecordingPersistence {
            fail_with: Some(PersistenceError::Io("disk full".to_string())),
            ..Default::default()
        });
        let epic = SaveConfigEpic::new(persistence);

        let inputs = stream::iter(vec![Action::from(ConfigAction::SaveConfig)]).boxed();
        let out: Vec<_> = epic
            .run(inputs, &EpicContext::detached())
            .expect("run")
            .collect()
            .await;

        match out.as_slice() {
            [Ok(Action::Config(ConfigAction::SaveConfigFailed { error }))] => {
                assert!(error.contains("disk full"));
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_config_merges_stored_options() {
        let mut stored = Config::new();
        stored.set("lineNumbers", json!(true));
        let persistence = Arc::new(RecordingPersistence {
            stored: Mutex::new(Some(stored.clone())),
            ..Default::default()
        });
        let epic = LoadConfigEpic::new(persistence);

        let inputs = stream::iter(vec![Action::from(ConfigAction::LoadConfig)]).boxed();
        let out: Vec<_> = epic
            .run(inputs, &EpicContext::detached())
            .expect("run")
            .collect()
            .await;

        assert_eq!(
            out,
            vec![Ok(Action::from(ConfigAction::MergeConfig { config: stored }))]
        );
    }
}
