// src/models/member.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::Record;

// --- Enums (Mapeando o Postgres) ---

/// Cargo eclesiástico. Conjunto fechado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ecclesiastical_role")]
#[serde(rename_all = "snake_case")]
pub enum EcclesiasticalRole {
    #[sqlx(rename = "Nenhum")]
    None,
    #[sqlx(rename = "Auxiliar de Diácono(isa)")]
    DeaconAssistant,
    #[sqlx(rename = "Presbítero(a)")]
    Presbyter,
    #[sqlx(rename = "Evangelista")]
    Evangelist,
    #[sqlx(rename = "Pastor(a)")]
    Pastor,
    #[sqlx(rename = "Bispo(a)")]
    Bishop,
    #[sqlx(rename = "Apóstolo(a)")]
    Apostle,
}

impl EcclesiasticalRole {
    pub fn label(&self) -> &'static str {
        match self {
            EcclesiasticalRole::None => "Nenhum",
            EcclesiasticalRole::DeaconAssistant => "Auxiliar de Diácono(isa)",
            EcclesiasticalRole::Presbyter => "Presbítero(a)",
            EcclesiasticalRole::Evangelist => "Evangelista",
            EcclesiasticalRole::Pastor => "Pastor(a)",
            EcclesiasticalRole::Bishop => "Bispo(a)",
            EcclesiasticalRole::Apostle => "Apóstolo(a)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_sex")]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[sqlx(rename = "Masculino")]
    Male,
    #[sqlx(rename = "Feminino")]
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "marital_status")]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    #[sqlx(rename = "Solteiro(a)")]
    Single,
    #[sqlx(rename = "Casado(a)")]
    Married,
    #[sqlx(rename = "Viúvo(a)")]
    Widowed,
    #[sqlx(rename = "União Estável")]
    CivilUnion,
}

// --- Structs ---

/// Endereço guardado como JSONB na linha do membro.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[schema(example = "Rua das Flores")]
    pub street: String,
    #[schema(example = "123")]
    pub number: String,
    pub district: String,
    pub city: String,
    #[schema(example = "SP")]
    pub state: String,
    #[schema(example = "Brasil")]
    pub country: String,
    #[schema(example = "01000-000")]
    pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "2024-0001")]
    pub registration_number: Option<String>,

    #[schema(example = "Maria da Silva")]
    pub full_name: String,

    #[schema(value_type = Option<String>, format = Date, example = "1990-05-12")]
    pub birth_date: Option<NaiveDate>,

    pub phone: Option<String>,
    pub email: Option<String>,

    // CPF
    pub document_number: Option<String>,

    pub sex: Option<Sex>,
    pub marital_status: Option<MaritalStatus>,
    pub baptized: bool,
    pub role: EcclesiasticalRole,

    #[schema(value_type = Option<Address>)]
    pub address: Option<Json<Address>>,

    pub congregation_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Record for Member {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Campos editáveis do próprio perfil. Tudo que não está aqui não muda pela tela de perfil.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfileUpdate {
    #[validate(length(min = 3, message = "O nome deve ter no mínimo 3 caracteres."))]
    #[schema(example = "Maria da Silva Souza")]
    pub full_name: String,

    #[validate(length(max = 30, message = "Telefone muito longo."))]
    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    pub marital_status: Option<MaritalStatus>,

    pub address: Option<Address>,
}

impl MemberProfileUpdate {
    /// Aplica a atualização numa cópia local (usado pelo backend em memória).
    pub fn apply_to(&self, member: &mut Member) {
        member.full_name = self.full_name.clone();
        member.phone = self.phone.clone();
        member.marital_status = self.marital_status;
        member.address = self.address.clone().map(Json);
    }
}

/// Dados mínimos do perfil criado junto com a conta.
#[derive(Debug, Clone)]
pub struct NewMemberProfile {
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub email: String,
}
