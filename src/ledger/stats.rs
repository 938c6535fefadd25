// src/ledger/stats.rs

// Agregados do dashboard. Varredura simples, recalculada a cada requisição.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::money::{cents_to_reais, rate_fraction, round_half_up};
use crate::ledger::status::resolve_status;
use crate::ledger::LedgerError;
use crate::models::dashboard::{
    DashboardStats, EstatisticasParcelas, RankingCliente, StatusStats, TipoTransacao, Transacao,
};
use crate::models::emprestimo::{Emprestimo, EmprestimoComCliente, StatusPagamento};
use crate::models::parcela::Parcela;

pub const RANKING_LIMIT: usize = 10;
pub const TRANSACOES_LIMIT: usize = 20;

const CLIENTE_DESCONHECIDO: &str = "Desconhecido";

/// Principal + um período de juros, em reais (sem arredondar).
pub fn total_with_interest(valor_emprestado: i64, taxa: i32) -> Decimal {
    let principal = cents_to_reais(valor_emprestado);
    principal + principal * rate_fraction(taxa)
}

/// Cards do topo: só empréstimos ainda não pagos. Somas arredondadas uma vez, no final.
pub fn dashboard_totals<'a>(
    emprestimos: impl IntoIterator<Item = &'a Emprestimo>,
    hoje: NaiveDate,
) -> Result<DashboardStats, LedgerError> {
    let mut principal = Decimal::ZERO;
    let mut juros = Decimal::ZERO;
    let mut atrasados = 0;
    let mut clientes = HashSet::new();

    for emp in emprestimos.into_iter().filter(|e| e.status != StatusPagamento::Pago) {
        let valor = Decimal::from(emp.valor_emprestado);
        principal += valor;
        juros += valor * rate_fraction(emp.taxa_juros);

        if emp.data_vencimento.is_some_and(|d| d < hoje) {
            atrasados += 1;
        }
        clientes.insert(emp.cliente_id);
    }

    Ok(DashboardStats {
        total_a_receber: round_half_up(principal + juros)?,
        lucro_potencial: round_half_up(juros)?,
        emprestimos_atrasados: atrasados,
        clientes_ativos: clientes.len(),
    })
}

fn count_status(stats: &mut StatusStats, status: StatusPagamento) {
    match status {
        StatusPagamento::Pago => stats.pagos += 1,
        StatusPagamento::Pendente => stats.pendentes += 1,
        StatusPagamento::Atrasado => stats.atrasados += 1,
    }
}

/// Contagem por status e ranking de pontualidade (top 10, estável, decrescente).
pub fn payment_stats(
    emprestimos: &[EmprestimoComCliente],
    hoje: NaiveDate,
) -> (StatusStats, Vec<RankingCliente>) {
    let mut status_stats = StatusStats::default();
    let mut posicoes: HashMap<Uuid, usize> = HashMap::new();
    let mut ranking: Vec<RankingCliente> = Vec::new();

    for item in emprestimos {
        let emp = &item.emprestimo;
        let status = resolve_status(emp.data_vencimento, emp.status, hoje);
        count_status(&mut status_stats, status);

        let Some(cliente) = &item.cliente else { continue };

        let idx = *posicoes.entry(cliente.id).or_insert_with(|| {
            ranking.push(RankingCliente {
                nome: cliente.nome.clone(),
                pagos: 0,
                atrasados: 0,
                total: 0,
                taxa_pontualidade: 0,
            });
            ranking.len() - 1
        });

        let linha = &mut ranking[idx];
        linha.total += 1;
        match status {
            StatusPagamento::Pago => linha.pagos += 1,
            StatusPagamento::Atrasado => linha.atrasados += 1,
            StatusPagamento::Pendente => {}
        }
    }

    for linha in &mut ranking {
        linha.taxa_pontualidade = punctuality_rate(linha.pagos, linha.total);
    }

    ranking.sort_by(|a, b| b.taxa_pontualidade.cmp(&a.taxa_pontualidade));
    ranking.truncate(RANKING_LIMIT);

    (status_stats, ranking)
}

/// round(pagos / total * 100), meio para cima.
pub fn punctuality_rate(pagos: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((pagos * 200 + total) / (total * 2)) as u32
}

/// Concessões de empréstimo + parcelas pagas, mais recentes primeiro (máx. 20).
pub fn recent_transactions(emprestimos: &[EmprestimoComCliente], parcelas: &[Parcela]) -> Vec<Transacao> {
    let nomes: HashMap<Uuid, &str> = emprestimos
        .iter()
        .filter_map(|e| e.cliente.as_ref().map(|c| (e.emprestimo.id, c.nome.as_str())))
        .collect();

    let concessoes = emprestimos.iter().map(|e| Transacao {
        id: format!("emp-{}", e.emprestimo.id),
        tipo: TipoTransacao::Emprestimo,
        data: e.emprestimo.data_emprestimo.and_time(NaiveTime::MIN).and_utc(),
        descricao: "Empréstimo concedido".to_string(),
        valor: e.emprestimo.valor_emprestado,
        cliente: e.cliente.as_ref().map_or(CLIENTE_DESCONHECIDO, |c| c.nome.as_str()).to_string(),
    });

    let pagamentos = parcelas.iter().filter(|p| p.is_paid()).filter_map(|p| {
        let data = p.data_pagamento?;
        Some(Transacao {
            id: format!("parc-{}", p.id),
            tipo: TipoTransacao::Pagamento,
            data,
            descricao: format!("Pagamento parcela {}", p.numero_parcela),
            valor: p.valor_pago.unwrap_or(p.valor_parcela),
            cliente: nomes.get(&p.emprestimo_id).copied().unwrap_or(CLIENTE_DESCONHECIDO).to_string(),
        })
    });

    let mut transacoes: Vec<Transacao> = concessoes.chain(pagamentos).collect();
    transacoes.sort_by(|a, b| b.data.cmp(&a.data));
    transacoes.truncate(TRANSACOES_LIMIT);
    transacoes
}

/// Atraso julgado pela data, independente do status gravado.
pub fn installment_stats(parcelas: &[Parcela], hoje: NaiveDate) -> EstatisticasParcelas {
    let mut stats = EstatisticasParcelas { total: parcelas.len(), ..Default::default() };

    for p in parcelas {
        if p.is_paid() {
            stats.pagas += 1;
        } else if p.data_vencimento < hoje {
            stats.atrasadas += 1;
        } else {
            stats.pendentes += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cliente::Cliente;
    use crate::models::emprestimo::TipoEmprestimo;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn data(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cliente(nome: &str) -> Cliente {
        Cliente {
            id: Uuid::new_v4(),
            nome: nome.to_string(),
            telefone: None,
            email: None,
            anotacoes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn emprestimo(cliente_id: Uuid, valor: i64, taxa: i32, vencimento: NaiveDate, status: StatusPagamento) -> Emprestimo {
        Emprestimo {
            id: Uuid::new_v4(),
            cliente_id,
            tipo_emprestimo: TipoEmprestimo::Parcelado,
            valor_emprestado: valor,
            taxa_juros: taxa,
            saldo_devedor: valor,
            quantidade_parcelas: 1,
            valor_parcela: valor,
            valor_juros_mensal: None,
            data_emprestimo: data(2025, 1, 1),
            data_vencimento: Some(vencimento),
            status,
            data_pagamento: None,
            modificado_por: None,
            modificado_em: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn com_cliente(emprestimo: Emprestimo, cliente: &Cliente) -> EmprestimoComCliente {
        EmprestimoComCliente {
            valor_total: total_with_interest(emprestimo.valor_emprestado, emprestimo.taxa_juros),
            emprestimo,
            cliente: Some(cliente.clone()),
        }
    }

    fn parcela(emprestimo_id: Uuid, numero: i32, pago_em: Option<(u32, u32)>) -> Parcela {
        Parcela {
            id: Uuid::new_v4(),
            emprestimo_id,
            numero_parcela: numero,
            data_vencimento: data(2025, numero as u32, 10),
            valor_parcela: 100_000,
            data_pagamento: pago_em.map(|(m, d)| Utc.with_ymd_and_hms(2025, m, d, 12, 0, 0).unwrap()),
            valor_pago: pago_em.map(|_| 95_000),
            status: if pago_em.is_some() { StatusPagamento::Pago } else { StatusPagamento::Pendente },
            modificado_por: None,
            modificado_em: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn total_with_interest_adds_one_period() {
        assert_eq!(total_with_interest(500_000, 1050), dec!(5525));
    }

    #[test]
    fn dashboard_ignores_paid_loans_and_rounds_once() {
        let hoje = data(2025, 3, 1);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let emprestimos = vec![
            emprestimo(a, 100_001, 1050, data(2025, 2, 1), StatusPagamento::Atrasado),
            emprestimo(a, 100_001, 1050, data(2025, 4, 1), StatusPagamento::Pendente),
            emprestimo(b, 900_000, 1000, data(2025, 1, 1), StatusPagamento::Pago),
        ];

        let stats = dashboard_totals(&emprestimos, hoje).unwrap();

        // juros: 2 * 10500,105 = 21000,21 -> 21000
        assert_eq!(stats.lucro_potencial, 21_000);
        assert_eq!(stats.total_a_receber, 221_002);
        assert_eq!(stats.emprestimos_atrasados, 1);
        assert_eq!(stats.clientes_ativos, 1);
    }

    #[test]
    fn punctuality_counts_overdue_pending_as_late() {
        let hoje = data(2025, 6, 1);
        let ana = cliente("Ana");
        let emprestimos = vec![
            com_cliente(emprestimo(ana.id, 1, 0, data(2025, 1, 1), StatusPagamento::Pago), &ana),
            com_cliente(emprestimo(ana.id, 1, 0, data(2025, 2, 1), StatusPagamento::Pendente), &ana),
            com_cliente(emprestimo(ana.id, 1, 0, data(2025, 3, 1), StatusPagamento::Pago), &ana),
        ];

        let (status, ranking) = payment_stats(&emprestimos, hoje);

        assert_eq!(status, StatusStats { pagos: 2, pendentes: 0, atrasados: 1 });
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].pagos, 2);
        assert_eq!(ranking[0].atrasados, 1);
        assert_eq!(ranking[0].total, 3);
        assert_eq!(ranking[0].taxa_pontualidade, 67);
    }

    #[test]
    fn ranking_is_sorted_stably_and_capped() {
        let hoje = data(2025, 1, 1);
        let clientes: Vec<Cliente> = (0..12).map(|i| cliente(&format!("Cliente {i}"))).collect();

        let mut emprestimos = Vec::new();
        for (i, c) in clientes.iter().enumerate() {
            let status = if i % 2 == 0 { StatusPagamento::Pendente } else { StatusPagamento::Pago };
            emprestimos.push(com_cliente(emprestimo(c.id, 1, 0, data(2026, 1, 1), status), c));
        }

        let (_, ranking) = payment_stats(&emprestimos, hoje);

        assert_eq!(ranking.len(), RANKING_LIMIT);
        let nomes: Vec<&str> = ranking.iter().take(6).map(|r| r.nome.as_str()).collect();
        assert_eq!(nomes, vec!["Cliente 1", "Cliente 3", "Cliente 5", "Cliente 7", "Cliente 9", "Cliente 11"]);
        assert_eq!(ranking[6].nome, "Cliente 0");
    }

    #[test]
    fn punctuality_rate_rounds_half_up() {
        assert_eq!(punctuality_rate(1, 2), 50);
        assert_eq!(punctuality_rate(2, 3), 67);
        assert_eq!(punctuality_rate(1, 3), 33);
        assert_eq!(punctuality_rate(1, 8), 13); // 12,5
        assert_eq!(punctuality_rate(0, 0), 0);
    }

    #[test]
    fn recent_transactions_merge_and_sort() {
        let ana = cliente("Ana");
        let emp = emprestimo(ana.id, 500_000, 800, data(2025, 2, 10), StatusPagamento::Pendente);
        let emp_id = emp.id;
        let emprestimos = vec![com_cliente(emp, &ana)];
        let parcelas = vec![
            parcela(emp_id, 1, Some((2, 10))),
            parcela(emp_id, 2, None),
            parcela(Uuid::new_v4(), 1, Some((3, 1))),
        ];

        let feed = recent_transactions(&emprestimos, &parcelas);

        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].cliente, "Desconhecido");
        assert_eq!(feed[1].descricao, "Pagamento parcela 1");
        assert_eq!(feed[1].valor, 95_000);
        assert_eq!(feed[1].cliente, "Ana");
        assert_eq!(feed[2].tipo, TipoTransacao::Emprestimo);
        assert_eq!(feed[2].id, format!("emp-{emp_id}"));
    }

    #[test]
    fn recent_transactions_are_capped() {
        let ana = cliente("Ana");
        let emprestimos: Vec<EmprestimoComCliente> = (0..25)
            .map(|_| com_cliente(emprestimo(ana.id, 1, 0, data(2025, 1, 1), StatusPagamento::Pendente), &ana))
            .collect();

        assert_eq!(recent_transactions(&emprestimos, &[]).len(), TRANSACOES_LIMIT);
    }

    #[test]
    fn installment_stats_judge_lateness_by_date() {
        let hoje = data(2025, 2, 15);
        let emp = Uuid::new_v4();
        let parcelas = vec![
            parcela(emp, 1, Some((1, 10))),
            parcela(emp, 2, None), // venceu 10/02
            parcela(emp, 3, None),
        ];

        assert_eq!(
            installment_stats(&parcelas, hoje),
            EstatisticasParcelas { pagas: 1, pendentes: 1, atrasadas: 1, total: 3 }
        );
    }
}
