use super::submission::Catalog;
use serde::{Deserialize, Serialize};

/// 界面选中状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub selected_student_id: Option<String>,
    pub selected_submission_file: Option<String>,
    pub selected_reference_file: Option<String>,
}

impl ViewState {
    /// 只有当选中的学生仍在目录中时才保留整个选中状态
    pub fn retain_valid(self, catalog: &Catalog) -> Self {
        match &self.selected_student_id {
            Some(id) if catalog.contains_key(id) => self,
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionRecord;
    use std::collections::BTreeMap;

    fn catalog_with(id: &str) -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(
            id.to_string(),
            SubmissionRecord {
                student_id: id.to_string(),
                student_name: "Unknown Student".to_string(),
                student_code: "N/A".to_string(),
                source_archive_name: format!("{}.zip", id),
                raw_archive_bytes: Vec::new(),
                files: BTreeMap::new(),
            },
        );
        catalog
    }

    fn selection(id: &str) -> ViewState {
        ViewState {
            selected_student_id: Some(id.to_string()),
            selected_submission_file: Some("main.c".to_string()),
            selected_reference_file: Some("ref.c".to_string()),
        }
    }

    #[test]
    fn test_keeps_selection_for_existing_student() {
        let state = selection("11111").retain_valid(&catalog_with("11111"));
        assert_eq!(state, selection("11111"));
    }

    #[test]
    fn test_drops_selection_for_missing_student() {
        let state = selection("22222").retain_valid(&catalog_with("11111"));
        assert_eq!(state, ViewState::default());
    }
}
