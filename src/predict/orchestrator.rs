//! Prediction orchestrator.
//!
//! Engineers a record once, then runs each enabled model that the bundle
//! provides. A model failure is recorded on that model's slot and never
//! affects the others; only malformed input aborts a record.

use std::sync::Arc;

use crate::domain::{
    Classification, EnabledModels, EngineeredRecord, ModelOutcome, ModelSlot, PredictionResult, RawRecord,
    Regression,
};
use crate::error::{ModelError, PipelineError};
use crate::features::{current_year, engineer};
use crate::models::{FeatureRow, Model};
use crate::registry::ArtifactBundle;

#[derive(Debug, Clone)]
pub struct Orchestrator {
    bundle: Arc<ArtifactBundle>,
    enabled: EnabledModels,
    reference_year: Option<i32>,
}

impl Orchestrator {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self {
            bundle,
            enabled: EnabledModels::default(),
            reference_year: None,
        }
    }

    pub fn with_enabled(mut self, enabled: EnabledModels) -> Self {
        self.enabled = enabled;
        self
    }

    /// Pin the year used for property age. Unpinned means "current year".
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn enabled(&self) -> EnabledModels {
        self.enabled
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(current_year)
    }

    /// Engineer `record` and run every enabled model on it.
    pub fn predict(&self, record: &RawRecord) -> Result<PredictionResult, PipelineError> {
        let engineered = engineer(record, self.reference_year())?;
        Ok(self.predict_engineered(engineered))
    }

    /// Run every enabled model on an already engineered record.
    pub fn predict_engineered(&self, engineered: EngineeredRecord) -> PredictionResult {
        let row = engineered.to_row();

        let classifier = match self.slot_model(ModelSlot::Classifier, self.enabled.classifier) {
            Ok(model) => contain(ModelSlot::Classifier, classify(model, &row)),
            Err(outcome) => outcome,
        };
        let rf = match self.slot_model(ModelSlot::RegressorRf, self.enabled.rf) {
            Ok(model) => contain(ModelSlot::RegressorRf, self.regress(ModelSlot::RegressorRf, model, &row)),
            Err(outcome) => outcome,
        };
        let xgb = match self.slot_model(ModelSlot::RegressorXgb, self.enabled.xgb) {
            Ok(model) => contain(ModelSlot::RegressorXgb, self.regress(ModelSlot::RegressorXgb, model, &row)),
            Err(outcome) => outcome,
        };

        PredictionResult {
            engineered,
            classifier,
            rf,
            xgb,
        }
    }

    /// The slot's model, or the non-error outcome explaining why it will not run.
    fn slot_model<T>(&self, slot: ModelSlot, enabled: bool) -> Result<&dyn Model, ModelOutcome<T>> {
        if !enabled {
            return Err(ModelOutcome::Disabled);
        }
        self.bundle.model(slot).ok_or_else(|| {
            tracing::debug!(slot = slot.display_name(), "model unavailable");
            ModelOutcome::Unavailable
        })
    }

    fn regress(&self, slot: ModelSlot, model: &dyn Model, row: &FeatureRow) -> Result<Regression, ModelError> {
        let raw = model.predict(row)?;
        if !raw.is_finite() {
            return Err(ModelError::NonFinite);
        }
        let scale = self.bundle.scales().for_slot(slot);
        Ok(Regression {
            raw,
            adjusted: raw / scale,
        })
    }
}

fn classify(model: &dyn Model, row: &FeatureRow) -> Result<Classification, ModelError> {
    let value = model.predict(row)?;
    if !value.is_finite() {
        return Err(ModelError::NonFinite);
    }
    let probability = match model.probabilistic() {
        Some(p) => {
            let prob = p.predict_probability(row)?;
            if !(0.0..=1.0).contains(&prob) {
                return Err(ModelError::Other(format!("probability {prob} is outside [0, 1]")));
            }
            Some(prob)
        }
        None => None,
    };
    Ok(Classification {
        label: value.trunc() as i64,
        probability,
    })
}

fn contain<T>(slot: ModelSlot, result: Result<T, ModelError>) -> ModelOutcome<T> {
    match result {
        Ok(value) => ModelOutcome::Ok(value),
        Err(err) => {
            tracing::warn!(slot = slot.display_name(), "model failed: {err}");
            ModelOutcome::Failed {
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields;
    use crate::models::ProbabilisticModel;
    use crate::registry::ScaleTable;

    const YEAR: i32 = 2026;

    /// Returns a constant.
    struct Fixed(f64);

    impl Model for Fixed {
        fn predict(&self, _row: &FeatureRow) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    /// Classifier with a probability output.
    struct Probabilistic {
        label: f64,
        prob: f64,
    }

    impl Model for Probabilistic {
        fn predict(&self, _row: &FeatureRow) -> Result<f64, ModelError> {
            Ok(self.label)
        }

        fn probabilistic(&self) -> Option<&dyn ProbabilisticModel> {
            Some(self)
        }
    }

    impl ProbabilisticModel for Probabilistic {
        fn predict_probability(&self, _row: &FeatureRow) -> Result<f64, ModelError> {
            Ok(self.prob)
        }
    }

    /// Always fails.
    struct Broken;

    impl Model for Broken {
        fn predict(&self, _row: &FeatureRow) -> Result<f64, ModelError> {
            Err(ModelError::Other("boom".to_string()))
        }
    }

    /// Reads a feature so we can see what the orchestrator passed in.
    struct EchoPpsf;

    impl Model for EchoPpsf {
        fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
            row.number("PPSF_Recalc")
        }
    }

    fn orchestrator(bundle: ArtifactBundle) -> Orchestrator {
        Orchestrator::new(Arc::new(bundle)).with_reference_year(YEAR)
    }

    fn full_bundle() -> ArtifactBundle {
        ArtifactBundle::empty()
            .with_classifier(Arc::new(Probabilistic { label: 1.0, prob: 0.83 }))
            .with_rf(Arc::new(Fixed(500.0)))
            .with_xgb(Arc::new(Fixed(900.0)))
            .with_scales(ScaleTable::new(2.0, 3.0))
    }

    #[test]
    fn all_models_populate_and_regressions_are_unscaled() {
        let result = orchestrator(full_bundle()).predict(&RawRecord::new()).unwrap();

        assert_eq!(result.investment_label(), Some(1));
        assert_eq!(result.investment_probability(), Some(0.83));
        assert_eq!(result.rf.value().unwrap().raw, 500.0);
        assert_eq!(result.rf_price(), Some(250.0));
        assert_eq!(result.xgb_price(), Some(300.0));
        assert!(result.errors().is_empty());
    }

    #[test]
    fn default_scale_reports_raw_value() {
        let bundle = ArtifactBundle::empty().with_rf(Arc::new(Fixed(123.5)));
        let result = orchestrator(bundle).predict(&RawRecord::new()).unwrap();
        let rf = result.rf.value().unwrap();
        assert_eq!(rf.raw, 123.5);
        assert_eq!(rf.adjusted, 123.5);
    }

    #[test]
    fn absent_rf_is_unavailable_without_error() {
        let bundle = ArtifactBundle::empty()
            .with_classifier(Arc::new(Fixed(0.0)))
            .with_xgb(Arc::new(Fixed(42.0)));
        let result = orchestrator(bundle).predict(&RawRecord::new()).unwrap();

        assert_eq!(result.rf, ModelOutcome::Unavailable);
        assert_eq!(result.xgb_price(), Some(42.0));
        assert_eq!(result.investment_label(), Some(0));
        assert!(result.errors().is_empty());
    }

    #[test]
    fn classifier_without_probability_capability_reports_none() {
        let bundle = ArtifactBundle::empty().with_classifier(Arc::new(Fixed(1.7)));
        let result = orchestrator(bundle).predict(&RawRecord::new()).unwrap();
        assert_eq!(
            result.classifier,
            ModelOutcome::Ok(Classification {
                label: 1,
                probability: None
            })
        );
    }

    #[test]
    fn failing_model_is_isolated() {
        let bundle = full_bundle().with_rf(Arc::new(Broken));
        let result = orchestrator(bundle).predict(&RawRecord::new()).unwrap();

        assert_eq!(result.rf.error(), Some("boom"));
        assert_eq!(result.rf_price(), None);
        assert_eq!(result.xgb_price(), Some(300.0));
        assert_eq!(result.investment_label(), Some(1));
        assert_eq!(result.errors(), vec![(ModelSlot::RegressorRf, "boom")]);
    }

    #[test]
    fn failing_classifier_clears_label_and_probability() {
        let bundle = full_bundle().with_classifier(Arc::new(Broken));
        let result = orchestrator(bundle).predict(&RawRecord::new()).unwrap();
        assert_eq!(result.investment_label(), None);
        assert_eq!(result.investment_probability(), None);
        assert_eq!(result.classifier.error(), Some("boom"));
        assert_eq!(result.rf_price(), Some(250.0));
    }

    #[test]
    fn out_of_range_probability_fails_classifier() {
        let bundle = ArtifactBundle::empty().with_classifier(Arc::new(Probabilistic { label: 1.0, prob: 1.5 }));
        let result = orchestrator(bundle).predict(&RawRecord::new()).unwrap();
        assert!(result.classifier.error().is_some());
    }

    #[test]
    fn non_finite_regression_fails_slot() {
        let bundle = ArtifactBundle::empty().with_xgb(Arc::new(Fixed(f64::NAN)));
        let result = orchestrator(bundle).predict(&RawRecord::new()).unwrap();
        assert!(result.xgb.error().is_some());
    }

    #[test]
    fn disabled_models_are_not_errors() {
        let enabled = EnabledModels {
            classifier: false,
            rf: true,
            xgb: false,
        };
        let result = orchestrator(full_bundle())
            .with_enabled(enabled)
            .predict(&RawRecord::new())
            .unwrap();
        assert_eq!(result.classifier, ModelOutcome::Disabled);
        assert_eq!(result.xgb, ModelOutcome::Disabled);
        assert_eq!(result.rf_price(), Some(250.0));
        assert!(result.errors().is_empty());
    }

    #[test]
    fn models_receive_engineered_row() {
        let bundle = ArtifactBundle::empty().with_rf(Arc::new(EchoPpsf));
        let record = RawRecord::new()
            .with(fields::PRICE_IN_LAKHS, 100.0)
            .with(fields::SIZE_IN_SQFT, 1000.0);
        let result = orchestrator(bundle).predict(&record).unwrap();
        assert!((result.rf_price().unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn malformed_input_is_the_only_error() {
        let record = RawRecord::new().with(fields::BHK, "three");
        let err = orchestrator(full_bundle()).predict(&record).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput { field: "BHK", .. }));
    }
}
