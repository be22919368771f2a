//! Upstream paths and parameter names.
//!
//! The Open API is not consistent across endpoints (`goodId` vs `productId`,
//! `pageSize` vs `size`), so every name is configuration rather than a
//! constant baked into the calls.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEndpoint {
    pub path: String,
    pub keyword_param: String,
    pub page_param: String,
    pub page_size_param: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEndpoint {
    pub path: String,
    pub id_param: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestEndpoint {
    pub path: String,
    pub keyword_param: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub token_path: String,
    pub search: ListEndpoint,
    pub detail: ItemEndpoint,
    pub skus: ItemEndpoint,
    pub categories_path: String,
    pub suggest: SuggestEndpoint,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token_path: "/oauth/token".into(),
            search: ListEndpoint {
                path: "/open/cn_product/list".into(),
                keyword_param: "q".into(),
                page_param: "page".into(),
                page_size_param: "pageSize".into(),
            },
            detail: ItemEndpoint {
                path: "/open/cn_product/detail".into(),
                id_param: "goodId".into(),
            },
            skus: ItemEndpoint {
                path: "/open/cn_product/sku/list".into(),
                id_param: "goodId".into(),
            },
            categories_path: "/open/cn_category/list".into(),
            suggest: SuggestEndpoint {
                path: "/search/suggest.do".into(),
                keyword_param: "q".into(),
            },
        }
    }
}

impl Endpoints {
    /// Apply overrides looked up by variable name, e.g. `YIWUGO_DETAIL_ID_PARAM`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fields: [(&str, &mut String); 12] = [
            ("YIWUGO_TOKEN_PATH", &mut self.token_path),
            ("YIWUGO_SEARCH_PATH", &mut self.search.path),
            ("YIWUGO_SEARCH_KEYWORD_PARAM", &mut self.search.keyword_param),
            ("YIWUGO_SEARCH_PAGE_PARAM", &mut self.search.page_param),
            ("YIWUGO_SEARCH_PAGE_SIZE_PARAM", &mut self.search.page_size_param),
            ("YIWUGO_DETAIL_PATH", &mut self.detail.path),
            ("YIWUGO_DETAIL_ID_PARAM", &mut self.detail.id_param),
            ("YIWUGO_SKU_PATH", &mut self.skus.path),
            ("YIWUGO_SKU_ID_PARAM", &mut self.skus.id_param),
            ("YIWUGO_CATEGORY_PATH", &mut self.categories_path),
            ("YIWUGO_SUGGEST_PATH", &mut self.suggest.path),
            ("YIWUGO_SUGGEST_KEYWORD_PARAM", &mut self.suggest.keyword_param),
        ];
        for (key, field) in fields {
            if let Some(val) = lookup(key).filter(|val| !val.trim().is_empty()) {
                *field = val.trim().to_owned();
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_named_fields() {
        let endpoints = Endpoints::default().with_overrides(|key| match key {
            "YIWUGO_DETAIL_ID_PARAM" => Some("productId".into()),
            "YIWUGO_SKU_PATH" => Some("/open/cn_product/skuList".into()),
            "YIWUGO_SEARCH_PAGE_PARAM" => Some("  ".into()),
            _ => None,
        });

        assert_eq!(endpoints.detail.id_param, "productId");
        assert_eq!(endpoints.skus.path, "/open/cn_product/skuList");
        assert_eq!(endpoints.search.page_param, "page");
        assert_eq!(endpoints.skus.id_param, "goodId");
    }
}
