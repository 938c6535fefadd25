// src/services/notifier.rs

use async_trait::async_trait;

use crate::{
    common::{error::AppError, money::cents_to_reais},
    models::{cliente::Cliente, emprestimo::Emprestimo},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mensagem {
    pub para: String,
    pub assunto: String,
    pub corpo: String,
}

/// Canal de envio de mensagens aos clientes (e-mail).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn enviar(&self, mensagem: Mensagem) -> Result<(), AppError>;
}

/// Não envia nada: só registra a mensagem no log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn enviar(&self, mensagem: Mensagem) -> Result<(), AppError> {
        tracing::info!(
            para = %mensagem.para,
            assunto = %mensagem.assunto,
            "📧 E-mail registrado (envio simulado)"
        );
        tracing::debug!("{}", mensagem.corpo);
        Ok(())
    }
}

fn email_do_cliente(cliente: &Cliente) -> Result<String, AppError> {
    cliente
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::BusinessRule("Cliente não possui e-mail cadastrado.".into()))
}

pub fn anotacoes_message(cliente: &Cliente) -> Result<Mensagem, AppError> {
    Ok(Mensagem {
        para: email_do_cliente(cliente)?,
        assunto: format!("Anotações - {}", cliente.nome),
        corpo: cliente.anotacoes.clone().unwrap_or_default(),
    })
}

pub fn lembrete_atraso_message(cliente: &Cliente, emprestimo: &Emprestimo) -> Result<Mensagem, AppError> {
    let vencimento = emprestimo
        .data_vencimento
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "N/A".to_string());

    Ok(Mensagem {
        para: email_do_cliente(cliente)?,
        assunto: "Lembrete de atraso".to_string(),
        corpo: format!(
            "Cliente: {}\nValor em atraso: R$ {:.2}\nVencimento: {}",
            cliente.nome,
            cents_to_reais(emprestimo.valor_emprestado),
            vencimento
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use crate::models::emprestimo::{StatusPagamento, TipoEmprestimo};

    fn cliente(email: Option<&str>) -> Cliente {
        Cliente {
            id: Uuid::new_v4(),
            nome: "Maria".into(),
            telefone: None,
            email: email.map(str::to_string),
            anotacoes: Some("Prefere contato à tarde".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn client_without_email_cannot_be_notified() {
        assert!(matches!(anotacoes_message(&cliente(None)), Err(AppError::BusinessRule(_))));
        assert!(matches!(anotacoes_message(&cliente(Some("  "))), Err(AppError::BusinessRule(_))));
    }

    #[test]
    fn notes_go_to_client_email() {
        let mensagem = anotacoes_message(&cliente(Some("maria@email.com"))).unwrap();
        assert_eq!(mensagem.para, "maria@email.com");
        assert_eq!(mensagem.corpo, "Prefere contato à tarde");
    }

    #[test]
    fn late_reminder_shows_amount_and_due_date() {
        let c = cliente(Some("maria@email.com"));
        let emprestimo = Emprestimo {
            id: Uuid::new_v4(),
            cliente_id: c.id,
            tipo_emprestimo: TipoEmprestimo::Parcelado,
            valor_emprestado: 150_050,
            taxa_juros: 800,
            saldo_devedor: 150_050,
            quantidade_parcelas: 1,
            valor_parcela: 150_050,
            valor_juros_mensal: None,
            data_emprestimo: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            data_vencimento: NaiveDate::from_ymd_opt(2025, 2, 10),
            status: StatusPagamento::Atrasado,
            data_pagamento: None,
            modificado_por: None,
            modificado_em: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mensagem = lembrete_atraso_message(&c, &emprestimo).unwrap();
        assert!(mensagem.corpo.contains("R$ 1500.50"));
        assert!(mensagem.corpo.contains("10/02/2025"));
    }

    #[tokio::test]
    async fn log_notifier_accepts_messages() {
        let mensagem = anotacoes_message(&cliente(Some("maria@email.com"))).unwrap();
        assert!(LogNotifier.enviar(mensagem).await.is_ok());
    }
}
