// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::money::as_reais;

// 1. Cards do topo (somente empréstimos não pagos)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 15525.0)]
    pub total_a_receber: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 1525.0)]
    pub lucro_potencial: i64,

    pub emprestimos_atrasados: usize,
    pub clientes_ativos: usize,
}

// 2. Contagem por status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusStats {
    pub pagos: usize,
    pub pendentes: usize,
    pub atrasados: usize,
}

// 3. Ranking de pontualidade por cliente
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingCliente {
    pub nome: String,
    pub pagos: usize,
    pub atrasados: usize,
    pub total: usize,
    /// 0..=100
    pub taxa_pontualidade: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStats {
    pub status_stats: StatusStats,
    pub ranking_clientes: Vec<RankingCliente>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TipoTransacao {
    Emprestimo,
    Pagamento,
}

// 4. Feed de transações recentes
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transacao {
    #[schema(example = "emp-550e8400-e29b-41d4-a716-446655440000")]
    pub id: String,
    pub tipo: TipoTransacao,
    pub data: DateTime<Utc>,
    pub descricao: String,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64)]
    pub valor: i64,

    pub cliente: String,
}

// 5. Contagem de parcelas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstatisticasParcelas {
    pub pagas: usize,
    pub pendentes: usize,
    pub atrasadas: usize,
    pub total: usize,
}
