use chapy_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(
        "Dockerに接続できません: {0}\n\nヒント:\n  • Dockerが起動しているか確認してください\n  • DOCKER_HOST の設定を確認してください\n  • docker ps コマンドが正常に動作するか確認してください"
    )]
    DockerConnectionFailed(String),

    #[error("コンテナ '{container}' が見つかりません")]
    ContainerNotFound { container: String },

    #[error("Docker APIエラー: {0}")]
    DockerApiError(String),
}

impl ContainerError {
    /// 実行対象名を付けてコアのエラーに変換
    pub fn into_core(self, target: &str) -> CoreError {
        CoreError::ExecFailed {
            target: target.to_string(),
            message: self.to_string(),
        }
    }
}

impl From<bollard::errors::Error> for ContainerError {
    fn from(err: bollard::errors::Error) -> Self {
        match &err {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404,
                message,
            } => ContainerError::ContainerNotFound {
                container: message.clone(),
            },
            _ => {
                // 接続エラーの可能性をチェック
                let err_str = err.to_string();
                if err_str.contains("Connection refused")
                    || err_str.contains("No such file or directory")
                {
                    ContainerError::DockerConnectionFailed(err_str)
                } else {
                    ContainerError::DockerApiError(err_str)
                }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ContainerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mapping() {
        let err = bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message: "No such container: web".to_string(),
        };
        assert!(matches!(
            ContainerError::from(err),
            ContainerError::ContainerNotFound { .. }
        ));
    }

    #[test]
    fn test_api_error_mapping() {
        let err = bollard::errors::Error::DockerResponseServerError {
            status_code: 500,
            message: "boom".to_string(),
        };
        assert!(matches!(
            ContainerError::from(err),
            ContainerError::DockerApiError(_)
        ));
    }

    #[test]
    fn test_into_core() {
        let err = ContainerError::DockerApiError("boom".to_string()).into_core("web-1");
        match err {
            CoreError::ExecFailed { target, message } => {
                assert_eq!(target, "web-1");
                assert!(message.contains("boom"));
            }
            other => panic!("Expected ExecFailed, got {other:?}"),
        }
    }
}
