/*
 * Responsibility
 * - Handler から見える「テナント解決済みコンテキスト」の型
 * - middleware が subdomain から解決して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - テナントの存在確認 (registry lookup) はここでは行わない
 */
use std::fmt;

/// Tenant identifier taken verbatim from the first host label.
///
/// Case is preserved; the only guarantee is that it is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    /// Returns `None` for an empty label.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request-scoped tenant binding, inserted once by the tenant middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantCtx {
    pub tenant_id: TenantId,
}

impl TenantCtx {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }
}
