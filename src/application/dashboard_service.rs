// Dashboard service - Use case for rendering a role's dashboard
use crate::application::dataset_cache::{CacheStatus, DatasetCache};
use crate::application::metrics::compute_metrics;
use crate::application::view_model_builder::ViewModelBuilder;
use crate::domain::dataset::{Dataset, DatasetBundle};
use crate::domain::error::DashboardError;
use crate::domain::role::Role;
use crate::domain::view_model::ViewModel;
use crate::infrastructure::config::RoleLayouts;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSummary {
    pub slug: &'static str,
    pub name: &'static str,
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct DashboardService {
    cache: Arc<DatasetCache>,
    layouts: Arc<RoleLayouts>,
    builder: ViewModelBuilder,
}

impl DashboardService {
    pub fn new(cache: Arc<DatasetCache>, layouts: Arc<RoleLayouts>) -> Self {
        let builder = ViewModelBuilder::new(layouts.clone());
        Self {
            cache,
            layouts,
            builder,
        }
    }

    /// Load → aggregate → build, for one page render
    pub fn render(&self, role: Role) -> Result<ViewModel, DashboardError> {
        let layout = self
            .layouts
            .get(role)
            .ok_or_else(|| DashboardError::missing_data(role, "layout", "no layout configured"))?;

        let datasets = layout
            .datasets()
            .into_iter()
            .map(|name| self.cache.get(name))
            .collect::<Result<DatasetBundle, _>>()?;
        tracing::debug!(
            role = role.slug(),
            datasets = ?datasets.names().collect::<Vec<_>>(),
            "datasets ready"
        );

        let metrics = compute_metrics(layout, &datasets)?;
        let view = self.builder.build(role, &datasets, &metrics)?;

        tracing::debug!(
            role = role.slug(),
            kpis = view.kpis.len(),
            charts = view.charts.len(),
            tables = view.tables.len(),
            "dashboard built"
        );
        Ok(view)
    }

    pub fn list_roles(&self) -> Vec<RoleSummary> {
        self.layouts
            .iter()
            .map(|layout| RoleSummary {
                slug: layout.role.slug(),
                name: layout.role.display_name(),
                title: layout.title.clone(),
                description: layout.description.clone(),
            })
            .collect()
    }

    pub fn dataset(&self, name: &str) -> Result<Arc<Dataset>, DashboardError> {
        self.cache.load(name)
    }

    pub fn cache_status(&self) -> Vec<CacheStatus> {
        self.cache.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dataset_cache::tests::CountingStore;
    use crate::domain::dataset::DatasetName;
    use crate::domain::view_model::KpiValue;
    use crate::infrastructure::config::tests::shipped_layouts;
    use crate::infrastructure::fs_dataset_store::FsDatasetStore;
    use std::path::Path;

    fn shipped_service() -> DashboardService {
        let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let cache = Arc::new(DatasetCache::new(Arc::new(FsDatasetStore::new(data_dir))));
        DashboardService::new(cache, Arc::new(shipped_layouts()))
    }

    #[test]
    fn test_every_role_renders_from_shipped_data() {
        let service = shipped_service();
        for role in Role::ALL {
            let view = service
                .render(role)
                .unwrap_or_else(|e| panic!("{role} failed to render: {e}"));
            assert_eq!(view.role, role);
            assert!(!view.kpis.is_empty());
        }
    }

    #[test]
    fn test_render_is_repeatable() {
        let service = shipped_service();
        assert_eq!(
            service.render(Role::Sales).unwrap(),
            service.render(Role::Sales).unwrap()
        );
    }

    #[test]
    fn test_sales_dashboard_averages_daily_sales() {
        let view = shipped_service().render(Role::Sales).unwrap();

        // 7 daily records: 57600 sales and 727 units in total
        let daily = view.kpis.iter().find(|k| k.id == "daily_sales").unwrap();
        match daily.value {
            KpiValue::Number(v) => assert!((v - 57600.0 / 7.0).abs() < 1e-9),
            ref other => panic!("expected number, got {other:?}"),
        }
        let units = view.kpis.iter().find(|k| k.id == "units_sold").unwrap();
        match units.value {
            KpiValue::Number(v) => assert!((v - 727.0 / 7.0).abs() < 1e-9),
            ref other => panic!("expected number, got {other:?}"),
        }

        // the sales page also reads the customers dataset
        let new_customers = view.kpis.iter().find(|k| k.id == "new_customers").unwrap();
        assert_eq!(new_customers.value, KpiValue::Number(128.0));
    }

    #[test]
    fn test_load_failure_aborts_render() {
        let store = CountingStore::with(DatasetName::Sales, "{ \"total_revenue\": ");
        let cache = Arc::new(DatasetCache::new(Arc::new(store)));
        let service = DashboardService::new(cache, Arc::new(shipped_layouts()));

        assert!(matches!(
            service.render(Role::Ceo),
            Err(DashboardError::Parse { dataset: DatasetName::Sales, .. })
        ));
        // customers.json is not stored at all
        assert!(matches!(
            service.render(Role::Customers),
            Err(DashboardError::Io { dataset: DatasetName::Customers, .. })
        ));
    }

    #[test]
    fn test_list_roles_in_role_order() {
        let roles = shipped_service().list_roles();
        let slugs: Vec<&str> = roles.iter().map(|r| r.slug).collect();
        assert_eq!(slugs, vec!["ceo", "marketing", "inventory", "sales", "customers"]);
        assert_eq!(roles[3].name, "Sales Executive");
    }

    #[test]
    fn test_dataset_lookup_by_name() {
        let service = shipped_service();
        assert!(matches!(service.dataset("payroll"), Err(DashboardError::NotFound(_))));

        let inventory = service.dataset("inventory").unwrap();
        assert_eq!(inventory.name(), DatasetName::Inventory);
        assert!(service
            .cache_status()
            .iter()
            .any(|s| s.name == DatasetName::Inventory && s.loaded));
    }
}
