// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Taxonomia de erros da camada de workflow + erros de autenticação.
// Nenhum deles derruba o processo: todos voltam para quem chamou.
#[derive(Debug, Error)]
pub enum AppError {
    /// Busca que deveria retornar exatamente uma linha e não retornou nada.
    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    /// Rede ou banco indisponível.
    #[error("Falha de comunicação com o backend: {0}")]
    TransportFailure(String),

    /// O backend recusou a escrita (validação, permissão, constraint).
    #[error("Escrita rejeitada pelo backend: {0}")]
    WriteRejected(String),

    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Nenhuma sessão ativa")]
    NotSignedIn,

    #[error("Permissão necessária: {0}")]
    Forbidden(&'static str),

    // `anyhow::Error` para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Classificação para leituras: qualquer coisa além de "sem linhas" é transporte.
    pub fn from_read(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("registro"),
            other => AppError::TransportFailure(other.to_string()),
        }
    }

    /// Erros que deixam o estado anterior intacto e podem ser tentados de novo pelo chamador.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::TransportFailure(_))
    }
}

// Escritas: o banco respondeu com erro => rejeição; o resto é falha de transporte.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("registro"),
            sqlx::Error::Database(db_err) => AppError::WriteRejected(db_err.message().to_string()),
            other => AppError::TransportFailure(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Forbidden(slug) => {
                let body = Json(json!({
                    "error": format!("Você precisa da permissão '{}' para realizar esta ação.", slug),
                }));
                return (StatusCode::FORBIDDEN, body).into_response();
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Registro não encontrado."),
            AppError::TransportFailure(ref e) => {
                tracing::warn!("Backend indisponível: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Não foi possível falar com o servidor. Tente novamente.")
            }
            AppError::WriteRejected(ref e) => {
                tracing::warn!("Escrita rejeitada: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, "O servidor recusou a alteração.")
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente."),
            AppError::NotSignedIn => (StatusCode::UNAUTHORIZED, "Faça login para continuar."),

            // Todos os outros erros viram 500, com a mensagem detalhada no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
