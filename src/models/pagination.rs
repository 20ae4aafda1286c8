//! 分页相关的数据结构

use serde::Serialize;

/// 解析后的分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    /// page 最小为 1；page_size 缺省取 default，超过 max 截断
    pub fn new(page: Option<u64>, page_size: Option<u64>, default_size: u64, max_size: u64) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s > 0)
            .unwrap_or(default_size)
            .min(max_size);
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub list: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(list: Vec<T>, pagination: Pagination, total: u64) -> Self {
        let has_more = pagination.page * pagination.page_size < total;
        Self {
            list,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
            has_more,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            list: self.list.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            has_more: self.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::new(None, None, 10, 50);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 10);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination::new(Some(0), Some(500), 10, 50);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 50);

        let p = Pagination::new(Some(3), Some(20), 10, 50);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_has_more() {
        let p = Pagination::new(Some(2), Some(10), 10, 50);
        assert!(PaginatedResponse::new(vec![0; 10], p, 25).has_more);
        assert!(!PaginatedResponse::new(vec![0; 10], p, 20).has_more);

        let json = serde_json::to_value(PaginatedResponse::new(vec![1], p, 11)).unwrap();
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["hasMore"], false);
    }
}
