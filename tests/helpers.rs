use std::collections::HashSet;

use kubernetriks_inspector::core::report::DispatchReport;

/// Every requested node ends up either created or failed, and job names never repeat.
pub fn check_report_accounts_for_every_node(report: &DispatchReport) {
    assert_eq!(
        report.requested(),
        report.created().len() + report.failures().len()
    );
    let unique_names: HashSet<&String> = report.created().iter().collect();
    assert_eq!(report.created().len(), unique_names.len());
}
