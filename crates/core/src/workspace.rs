//! 작업 디렉토리 경로
//!
//! 작업 디렉토리는 실행 시작 시(보통 현재 디렉토리) 고정되며, 체크아웃된
//! 소스 트리(`<root>/<product-id>`)와 로그/제품 보관 디렉토리 등 모든
//! 파생 경로의 기준이 됩니다.

use std::path::{Path, PathBuf};

use crate::types::ProductId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// 프로세스의 현재 작업 디렉토리를 사용합니다.
    pub fn current() -> std::io::Result<Self> {
        Ok(Self {
            root: std::env::current_dir()?,
        })
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<relative>`
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// `product`의 체크아웃된 소스 트리
    pub fn source_dir(&self, product: &ProductId) -> PathBuf {
        self.root.join(product.as_str())
    }

    /// `<root>/<product>/<relative>`
    pub fn source_path(&self, product: &ProductId, relative: impl AsRef<Path>) -> PathBuf {
        self.source_dir(product).join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_hang_off_root() {
        let ws = Workspace::at("/work");
        let product = ProductId::from("product-apim");
        assert_eq!(ws.path("logs"), PathBuf::from("/work/logs"));
        assert_eq!(ws.source_dir(&product), PathBuf::from("/work/product-apim"));
        assert_eq!(
            ws.source_path(&product, "modules/integration"),
            PathBuf::from("/work/product-apim/modules/integration")
        );
    }

    #[test]
    fn current_is_absolute() {
        let ws = Workspace::current().unwrap();
        assert!(ws.root().is_absolute());
    }
}
