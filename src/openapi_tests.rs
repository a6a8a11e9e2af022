#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::openapi::{schema::Schema, PathItemType, RefOr};
    use utoipa::OpenApi;

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components missing");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            _ => panic!("{} should be an object schema", name),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        let components = openapi.components.as_ref().unwrap();

        for name in [
            "ErrorResponse",
            "HealthResponse",
            "CategoryDto",
            "BudgetDto",
            "BudgetStatus",
            "ExpenseDto",
            "ExpenseInsights",
            "UserDto",
            "LoginResponse",
        ] {
            assert!(components.schemas.contains_key(name), "missing schema {}", name);
        }

        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = object_properties("ErrorResponse");
        for field in ["error", "message", "success"] {
            assert!(properties.iter().any(|p| p == field), "missing {}", field);
        }
    }

    #[test]
    fn test_health_response_schema_structure() {
        let properties = object_properties("HealthResponse");
        for field in ["status", "version", "database"] {
            assert!(properties.iter().any(|p| p == field), "missing {}", field);
        }
    }

    #[test]
    fn test_user_schema_hides_credentials() {
        let properties = object_properties("UserDto");
        assert!(properties.iter().any(|p| p == "role"));
        assert!(!properties.iter().any(|p| p == "password_hash"));
        assert!(!properties.iter().any(|p| p == "password_set_token"));
    }

    #[test]
    fn test_openapi_paths_cover_api() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for (path, method) in [
            ("/health", PathItemType::Get),
            ("/api/login", PathItemType::Post),
            ("/api/categories", PathItemType::Post),
            ("/api/categories/{id}", PathItemType::Patch),
            ("/api/budgets/status", PathItemType::Get),
            ("/api/budgets/{id}/lock", PathItemType::Post),
            ("/api/expenses", PathItemType::Post),
            ("/api/expenses/insights", PathItemType::Get),
            ("/api/users/update-role", PathItemType::Patch),
        ] {
            let item = paths
                .get(path)
                .unwrap_or_else(|| panic!("missing path {}", path));
            assert!(item.operations.contains_key(&method), "missing operation on {}", path);
        }
    }

    #[test]
    fn test_error_responses_reference_schema_by_name() {
        let openapi_json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(openapi_json.contains("#/components/schemas/ErrorResponse"));
    }
}
