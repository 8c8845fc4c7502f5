use crate::error::ReportErr;

/// Reads the value of `name` from an engine score report.
///
/// Reports look like `[<iteration>]\t<set>-<metric>:<value>\t...`, the leading
/// iteration tag is skipped.
///
/// # Errors
/// `ReportErr::MetricNotFound` if no field is named `name`,
/// `ReportErr::InvalidValue` if its value is not a number.
pub fn extract_metric(report: &str, name: &str) -> Result<f64, ReportErr> {
    let value = report
        .trim_end()
        .split('\t')
        .skip(1)
        .filter_map(|field| field.split_once(':'))
        .find_map(|(key, value)| (key == name).then_some(value))
        .ok_or_else(|| ReportErr::MetricNotFound {
            name: name.to_string(),
            report: report.to_string(),
        })?;

    value.trim().parse().map_err(|_| ReportErr::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_named_field() {
        let report = "[3]\tvalid-auc:0.912345\ttrain-auc:0.990000";

        assert_eq!(extract_metric(report, "valid-auc"), Ok(0.912345));
        assert_eq!(extract_metric(report, "train-auc"), Ok(0.99));
    }

    #[test]
    fn missing_field_is_not_found() {
        let err = extract_metric("[0]\tvalid-mlogloss:0.5", "valid-auc").unwrap_err();
        assert!(matches!(err, ReportErr::MetricNotFound { name, .. } if name == "valid-auc"));
    }

    #[test]
    fn iteration_tag_is_not_a_field() {
        assert!(extract_metric("[0]", "[0]").is_err());
        assert!(extract_metric("", "valid-auc").is_err());
    }

    #[test]
    fn unparsable_value_is_invalid() {
        assert_eq!(
            extract_metric("[0]\tvalid-auc:nope\n", "valid-auc"),
            Err(ReportErr::InvalidValue {
                name: "valid-auc".to_string(),
                value: "nope".to_string(),
            })
        );
    }
}
