// BatchJob - 1 回の実行の入力・出力・フィルタ・バックエンド

use crate::core::BackendKind;
use crate::kernels::FilterSpec;
use std::path::Path;

/// 既定の出力ルート
pub const DEFAULT_OUTPUT_ROOT: &str = "output_folder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    input_dir: String,
    output_root: String,
    filter: FilterSpec,
    backend: BackendKind,
    hybrid: bool,
}

impl BatchJob {
    pub fn new(input_dir: impl Into<String>, filter: FilterSpec, backend: BackendKind) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_root: DEFAULT_OUTPUT_ROOT.to_string(),
            filter,
            backend,
            hybrid: false,
        }
    }

    pub fn with_output_root(mut self, output_root: impl Into<String>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// 分散実行時、各プロセス内でも共有メモリ並列にする
    pub fn with_hybrid(mut self, hybrid: bool) -> Self {
        self.hybrid = hybrid;
        self
    }

    pub fn input_dir(&self) -> &str {
        &self.input_dir
    }

    pub fn output_root(&self) -> &str {
        &self.output_root
    }

    pub fn filter(&self) -> FilterSpec {
        self.filter
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn hybrid(&self) -> bool {
        self.hybrid
    }

    /// `<output_root>/<filter>_<backend>`
    pub fn output_dir(&self) -> String {
        Path::new(&self.output_root)
            .join(format!("{}_{}", self.filter.kind.as_str(), self.backend.as_str()))
            .to_string_lossy()
            .into_owned()
    }

    /// 出力ファイル名は入力と同じ（中身は常に PNG）
    pub fn output_path(&self, file_name: &str) -> String {
        Path::new(&self.output_dir())
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }

    pub fn input_path(&self, file_name: &str) -> String {
        Path::new(&self.input_dir)
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::FilterKind;

    #[test]
    fn test_output_path_convention() {
        let job = BatchJob::new("photos", FilterSpec::new(FilterKind::Sobel), BackendKind::Sequential);

        assert_eq!(job.output_dir(), "output_folder/sobel_sequential");
        assert_eq!(job.output_path("cat.jpg"), "output_folder/sobel_sequential/cat.jpg");
        assert_eq!(job.input_path("cat.jpg"), "photos/cat.jpg");
    }

    #[test]
    fn test_custom_output_root_and_backend_names() {
        let shared = BatchJob::new("in", FilterSpec::new(FilterKind::Otsu), BackendKind::SharedParallel)
            .with_output_root("/tmp/out");
        assert_eq!(shared.output_dir(), "/tmp/out/otsu_shared-parallel");

        let distributed = BatchJob::new("in", FilterSpec::new(FilterKind::Negative), BackendKind::Distributed)
            .with_hybrid(true);
        assert_eq!(distributed.output_dir(), "output_folder/negative_distributed");
        assert!(distributed.hybrid());
    }
}
