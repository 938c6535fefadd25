// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Bruno's Loan API", description = "Controle de empréstimos, parcelas e juros recorrentes"),
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Usuarios ---
        handlers::usuarios::list_usuarios,
        handlers::usuarios::create_usuario,
        handlers::usuarios::delete_usuario,

        // --- Clientes ---
        handlers::clientes::list_clientes,
        handlers::clientes::get_cliente,
        handlers::clientes::create_cliente,
        handlers::clientes::update_cliente,
        handlers::clientes::delete_cliente,
        handlers::clientes::enviar_anotacoes,
        handlers::clientes::list_emprestimos_do_cliente,

        // --- Emprestimos ---
        handlers::emprestimos::list_emprestimos,
        handlers::emprestimos::get_emprestimo,
        handlers::emprestimos::create_parcelado,
        handlers::emprestimos::create_juros_recorrente,
        handlers::emprestimos::update_emprestimo,
        handlers::emprestimos::marcar_como_pago,
        handlers::emprestimos::enviar_lembrete_atraso,

        // --- Parcelas ---
        handlers::emprestimos::list_parcelas,
        handlers::emprestimos::create_parcela,
        handlers::emprestimos::recalcular_parcelas,
        handlers::parcelas::pagar_parcela,
        handlers::parcelas::update_parcela,
        handlers::parcelas::delete_parcela,
        handlers::parcelas::transacoes_recentes,
        handlers::parcelas::estatisticas,

        // --- Juros Recorrente ---
        handlers::juros::list_pagamentos,
        handlers::juros::registrar_pagamento,
        handlers::juros::update_pagamento,
        handlers::juros::delete_pagamento,
        handlers::juros::list_amortizacoes,
        handlers::juros::registrar_amortizacao,
        handlers::juros::update_amortizacao,
        handlers::juros::delete_amortizacao,
        handlers::juros::totais,
        handlers::juros::recalcular_ledger,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
        handlers::dashboard::get_payment_stats,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::PapelUsuario,
            models::auth::Usuario,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::CreateUsuarioPayload,
            models::auth::DeleteUsuarioPayload,

            // --- Clientes ---
            models::cliente::Cliente,
            models::cliente::CreateClientePayload,
            models::cliente::UpdateClientePayload,

            // --- Emprestimos ---
            models::emprestimo::TipoEmprestimo,
            models::emprestimo::StatusPagamento,
            models::emprestimo::Emprestimo,
            models::emprestimo::EmprestimoComCliente,
            models::emprestimo::CreateParceladoPayload,
            models::emprestimo::CreateJurosRecorrentePayload,
            models::emprestimo::UpdateEmprestimoPayload,
            models::emprestimo::SuccessResponse,

            // --- Parcelas ---
            models::parcela::Parcela,
            models::parcela::PagarParcelaPayload,
            models::parcela::CreateParcelaPayload,
            models::parcela::UpdateParcelaPayload,
            models::parcela::PagarParcelaResponse,
            models::parcela::RecalculoParcelasResponse,

            // --- Juros Recorrente ---
            models::juros::PagamentoJuros,
            models::juros::Amortizacao,
            models::juros::TotaisJurosRecorrente,
            models::juros::AmortizacaoRegistrada,
            models::juros::LedgerRecalculado,
            models::juros::RegistrarPagamentoJurosPayload,
            models::juros::UpdatePagamentoJurosPayload,
            models::juros::RegistrarAmortizacaoPayload,
            models::juros::UpdateAmortizacaoPayload,

            // --- Dashboard ---
            models::dashboard::DashboardStats,
            models::dashboard::StatusStats,
            models::dashboard::RankingCliente,
            models::dashboard::PaymentStats,
            models::dashboard::TipoTransacao,
            models::dashboard::Transacao,
            models::dashboard::EstatisticasParcelas,
        )
    ),
    tags(
        (name = "Auth", description = "Login e sessão"),
        (name = "Usuarios", description = "Gestão de usuários (somente admin)"),
        (name = "Clientes", description = "Cadastro de clientes"),
        (name = "Emprestimos", description = "Empréstimos parcelados e de juros recorrente"),
        (name = "Parcelas", description = "Cronograma, pagamento e recálculo de parcelas"),
        (name = "Juros Recorrente", description = "Pagamentos de juros e amortizações do principal"),
        (name = "Dashboard", description = "Indicadores da carteira")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documento_tem_rotas_e_esquema_jwt() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/emprestimos/{id}/amortizacoes"));
        assert!(doc.paths.paths.contains_key("/api/dashboard/payment-stats"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
