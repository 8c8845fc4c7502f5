use std::{num::NonZeroUsize, ops::Range, sync::Arc};

use boosting::{BoostErr, Dataset, Engine, GbtEngine, Params};
use client::{
    Client, ClientErr, RoundConfig,
    codec::ModelCodec,
    data::DataPartition,
};
use parking_lot::Mutex;

fn dataset(rows: Range<usize>, classes: usize) -> Dataset {
    let mut data = Vec::new();
    let mut labels = Vec::new();

    for i in rows {
        let b = ((i * 7) % 13) as f32;
        let (a, label) = if classes <= 2 {
            let a = (i % 17) as f32;
            (a, if a + b > 14.0 { 1.0 } else { 0.0 })
        } else {
            let class = i % classes;
            (class as f32 * 2.0 + (i % 5) as f32 * 0.1, class as f32)
        };

        data.extend([a, b]);
        labels.push(label);
    }

    Dataset::from_rows(data, 2, labels).unwrap()
}

fn partition(classes: usize) -> Arc<DataPartition> {
    Arc::new(DataPartition::new(
        dataset(0..200, classes),
        dataset(200..290, classes),
    ))
}

fn config(classes: usize, local_rounds: usize) -> Arc<RoundConfig> {
    Arc::new(RoundConfig::for_classes(
        classes,
        2,
        NonZeroUsize::new(local_rounds).unwrap(),
    ))
}

fn gbt_client(classes: usize) -> Client<GbtEngine> {
    Client::new(GbtEngine, config(classes, 1), partition(classes))
}

#[test]
fn bootstrap_boosts_exactly_the_local_rounds() {
    let client = gbt_client(2);
    assert_eq!(client.boosted_rounds(), None);

    let outcome = client.fit(None).unwrap();
    assert_eq!(client.boosted_rounds(), Some(1));
    assert_eq!(outcome.num_examples, 200);
    assert!(!outcome.model.is_empty());

    let client = Client::new(GbtEngine, config(2, 3), partition(2));
    client.fit(None).unwrap();
    assert_eq!(client.boosted_rounds(), Some(3));
}

#[test]
fn fit_with_a_coordinator_model_adds_one_round() {
    let first = gbt_client(2);
    let global = first.fit(None).unwrap().model;

    let second = gbt_client(2);
    second.fit(Some(global.as_bytes())).unwrap();
    assert_eq!(second.boosted_rounds(), Some(2));

    let again = second.fit(Some(global.as_bytes())).unwrap();
    assert_eq!(second.boosted_rounds(), Some(2));
    assert_eq!(second.fits(), 2);

    let codec = ModelCodec::new(&GbtEngine);
    let decoded = codec.decode(again.model.as_bytes()).unwrap();
    assert_eq!(GbtEngine.boosted_rounds(&decoded), 2);
}

#[test]
fn first_fit_on_a_received_model_uses_local_settings() {
    let foreign = Client::new(
        GbtEngine,
        Arc::new(RoundConfig::for_classes(2, 7, NonZeroUsize::MIN)),
        partition(2),
    );
    let global = foreign.fit(None).unwrap().model;

    let client = gbt_client(2);
    let codec = ModelCodec::new(&GbtEngine);
    for _ in 0..2 {
        let outcome = client.fit(Some(global.as_bytes())).unwrap();
        let model = codec.decode(outcome.model.as_bytes()).unwrap();
        assert_eq!(model.params(), config(2, 1).params());
        assert_eq!(model.params().nthread, 2);
    }
}

#[test]
fn received_model_of_another_task_is_rejected() {
    let global = gbt_client(3).fit(None).unwrap().model;

    let client = gbt_client(2);
    let err = client.fit(Some(global.as_bytes())).unwrap_err();
    assert!(matches!(err, ClientErr::Decode(_)));
    assert_eq!(client.boosted_rounds(), None);
    assert_eq!(client.fits(), 0);
}

#[test]
fn fit_without_a_model_continues_the_local_one() {
    let client = gbt_client(2);
    client.fit(None).unwrap();
    client.fit(None).unwrap();
    assert_eq!(client.boosted_rounds(), Some(2));
}

#[test]
fn evaluate_before_fit_is_not_trained() {
    let client = gbt_client(2);
    let err = client.evaluate().unwrap_err();

    assert!(matches!(err, ClientErr::NotTrained));
    assert!(err.is_round_local());
}

#[test]
fn evaluate_reports_auc_on_the_validation_rows() {
    let client = gbt_client(2);
    client.fit(None).unwrap();

    let outcome = client.evaluate().unwrap();
    assert_eq!(outcome.metric.name, "AUC");
    assert_eq!(outcome.num_examples, 90);
    assert_eq!(outcome.loss, 0.0);

    let value = outcome.metric.value;
    assert!((0.0..=1.0).contains(&value));
    assert_eq!((value * 1e4).round() / 1e4, value);
}

#[test]
fn evaluate_reports_mlogloss_for_many_classes() {
    let client = gbt_client(3);
    client.fit(None).unwrap();

    let outcome = client.evaluate().unwrap();
    assert_eq!(outcome.metric.name, "mlogloss");
    assert!(outcome.metric.value > 0.0);
}

#[test]
fn decoded_model_scores_identically() {
    let engine = GbtEngine;
    let part = partition(2);
    let params = Params {
        nthread: 2,
        ..config(2, 1).params().clone()
    };

    let model = engine.train(&params, part.train(), &[], 3).unwrap();
    let codec = ModelCodec::new(&engine);
    let decoded = codec.decode(codec.encode(&model).unwrap().as_bytes()).unwrap();

    let evals = [(part.valid(), "valid")];
    assert_eq!(
        engine.score_report(&model, &evals, 2).unwrap(),
        engine.score_report(&decoded, &evals, 2).unwrap()
    );
}

#[test]
fn malformed_blob_keeps_the_local_model() {
    let client = gbt_client(2);
    client.fit(None).unwrap();
    let before = client.evaluate().unwrap();

    let err = client.fit(Some(b"not a model")).unwrap_err();
    assert!(matches!(err, ClientErr::Decode(_)));
    assert!(err.is_round_local());

    assert_eq!(client.boosted_rounds(), Some(1));
    assert_eq!(client.fits(), 1);
    assert_eq!(client.evaluate().unwrap(), before);
}

/// Engine double whose model is its boosted-round count.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn push(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl Engine for Recorder {
    type Model = usize;

    fn train(
        &self,
        _params: &Params,
        _dtrain: &Dataset,
        evals: &[(&Dataset, &str)],
        rounds: usize,
    ) -> boosting::Result<usize> {
        let names: Vec<_> = evals.iter().map(|(_, name)| *name).collect();
        self.push(format!("train {rounds} {}", names.join(",")));
        Ok(rounds)
    }

    fn update(&self, model: &mut usize, _dtrain: &Dataset, iteration: usize) -> boosting::Result<()> {
        self.push(format!("update {iteration}"));
        *model += 1;
        Ok(())
    }

    fn score_report(
        &self,
        _model: &usize,
        evals: &[(&Dataset, &str)],
        iteration: usize,
    ) -> boosting::Result<String> {
        self.push(format!("score {iteration}"));
        Ok(format!("[{iteration}]\t{}-auc:0.123456", evals[0].1))
    }

    fn serialize(&self, model: &usize) -> boosting::Result<Vec<u8>> {
        Ok(model.to_string().into_bytes())
    }

    fn deserialize(&self, bytes: &[u8]) -> boosting::Result<usize> {
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| BoostErr::InvalidParam {
                name: "model",
                reason: "not a round count".to_string(),
            })
    }

    fn boosted_rounds(&self, model: &usize) -> usize {
        *model
    }

    fn save_config(&self, _model: &usize) -> boosting::Result<String> {
        Ok("cfg".to_string())
    }

    fn load_config(&self, _model: &mut usize, config: &str) -> boosting::Result<()> {
        self.push(format!("load_config {config}"));
        Ok(())
    }

    fn params_config(&self, _params: &Params) -> boosting::Result<String> {
        Ok("local".to_string())
    }
}

#[test]
fn bootstrap_trains_with_both_local_sets() {
    let engine = Recorder::default();
    let client = Client::new(engine.clone(), config(2, 2), partition(2));

    let outcome = client.fit(None).unwrap();
    assert_eq!(outcome.model.as_bytes(), b"2");
    assert_eq!(engine.take(), ["train 2 validate,train"]);
}

#[test]
fn continuation_updates_from_the_received_round_count() {
    let engine = Recorder::default();
    let client = Client::new(engine.clone(), config(2, 2), partition(2));

    let outcome = client.fit(Some(b"4")).unwrap();
    assert_eq!(outcome.model.as_bytes(), b"6");
    assert_eq!(engine.take(), ["load_config local", "update 4", "update 5"]);

    // The model's own snapshot replaces the local settings from now on.
    client.fit(Some(b"9")).unwrap();
    assert_eq!(
        engine.take(),
        ["load_config cfg", "update 9", "update 10"]
    );
}

#[test]
fn evaluate_scores_the_last_round_of_the_valid_set() {
    let engine = Recorder::default();
    let client = Client::new(engine.clone(), config(2, 1), partition(2));

    client.fit(Some(b"3")).unwrap();
    engine.take();

    let outcome = client.evaluate().unwrap();
    assert_eq!(outcome.metric.name, "AUC");
    assert_eq!(outcome.metric.value, 0.1235);
    assert_eq!(engine.take(), ["score 3"]);
}
