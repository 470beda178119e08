//! Category listing and selection.

use crate::topic::Category;

/// Category list state. The list is replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoriesState {
    pub categories: Vec<Category>,
    pub selected_id: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Category transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoriesAction {
    /// Replace the category list; clears error and loading.
    SetCategories(Vec<Category>),
    SelectCategory(Option<String>),
    SetLoading(bool),
    /// A non-`None` error also clears the loading flag.
    SetError(Option<String>),
    ClearError,
}

impl CategoriesState {
    /// Apply one transition.
    pub fn apply(&mut self, action: CategoriesAction) {
        match action {
            CategoriesAction::SetCategories(categories) => {
                self.categories = categories;
                self.error = None;
                self.is_loading = false;
            }
            CategoriesAction::SelectCategory(id) => self.selected_id = id,
            CategoriesAction::SetLoading(loading) => self.is_loading = loading,
            CategoriesAction::SetError(error) => {
                if error.is_some() {
                    self.is_loading = false;
                }
                self.error = error;
            }
            CategoriesAction::ClearError => self.error = None,
        }
    }

    /// Find the currently selected category, if the id resolves.
    #[must_use]
    pub fn selected(&self) -> Option<&Category> {
        let id = self.selected_id.as_deref()?;
        self.categories.iter().find(|c| c.id == id)
    }
}
