//! # Local Replies
//!
//! Keyword matching over canned Portuguese replies, used whenever the webhook is
//! unset or fails. Selection order:
//!
//! 1. Follow-ups on topics from recent user messages (needs history)
//! 2. First keyword hit in [`KEYWORD_REPLIES`]
//! 3. A random entry of [`GENERIC_REPLIES`]

use super::responder::{ReplyContext, ResponderError, ResponseStrategy};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::debug;

/// History window scanned for topics.
const TOPIC_WINDOW: usize = 5;

const TOPIC_KEYWORDS: [&str; 6] = ["vendas", "processo", "cliente", "marketing", "financeiro", "estoque"];

pub(crate) const SALES_REPLY: &str = "Vendas são cruciais! Nossa IA pode automatizar seu funil de vendas e aumentar suas conversões em até 60%. Que tipo de produtos/serviços você vende?";
const SERVICE_REPLY: &str = "O atendimento ao cliente é fundamental! Posso ajudar a implementar chatbots inteligentes que respondem 24/7 e aumentam a satisfação dos clientes.";
const PROCESS_REPLY: &str = "Otimização de processos é nossa especialidade! Nossa IA pode mapear seus fluxos atuais e sugerir automações que economizam tempo e recursos.";

const SALES_FOLLOW_UP: &str = "Com base em nossa conversa anterior sobre vendas, vejo que você quer resultados concretos. Vamos implementar um sistema de automação que pode aumentar suas vendas em 40-60% nos próximos 3 meses. Que métricas você gostaria de acompanhar?";
const PROCESS_FOLLOW_UP: &str = "Perfeito! Já mapeamos seus processos na nossa conversa anterior. Agora vamos para a implementação. Sugiro começarmos pela automação do processo mais crítico. Qual é sua prioridade imediata?";

/// Checked in order; first substring hit wins.
pub const KEYWORD_REPLIES: [(&str, &str); 10] = [
    ("vendas", SALES_REPLY),
    ("vender", SALES_REPLY),
    ("cliente", SERVICE_REPLY),
    ("atendimento", SERVICE_REPLY),
    ("processo", PROCESS_REPLY),
    ("operação", PROCESS_REPLY),
    ("marketing", "Marketing digital automatizado pode aumentar seu ROI significativamente! Posso sugerir estratégias de automação para campanhas e nutrição de leads."),
    ("financeiro", "Gestão financeira inteligente é crucial para o crescimento. Nossa IA pode automatizar relatórios, fluxo de caixa e análise de rentabilidade."),
    ("estoque", "Controle de estoque automatizado evita perdas e otimiza custos. Posso implementar sistemas preditivos para reabastecimento inteligente."),
    ("produtividade", "Aumento de produtividade é nosso foco principal! Vamos identificar gargalos e implementar soluções que multiplicam sua eficiência operacional."),
];

pub const GENERIC_REPLIES: [&str; 7] = [
    "Entendo sua necessidade. Vamos analisar os dados do seu negócio para identificar oportunidades de automação.",
    "Interessante! Com base no que você compartilhou, posso sugerir algumas estratégias para otimizar seus processos.",
    "Perfeito! Vou preparar um diagnóstico personalizado para sua situação. Pode me contar mais sobre seus principais desafios?",
    "Excelente pergunta! Nossa IA pode ajudar a automatizar esse processo e aumentar sua eficiência em até 80%.",
    "Baseado na sua descrição, identifiquei 3 oportunidades principais de melhoria. Gostaria que eu detalhe cada uma?",
    "Essa é uma situação comum que vemos em muitos negócios. Nossa solução de automação pode resolver isso de forma eficiente.",
    "Entendo perfeitamente. Deixe-me analisar seu caso e sugerir as melhores práticas de automação para sua situação.",
];

/// Infallible local reply generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackStrategy;

impl FallbackStrategy {
    pub fn reply(&self, ctx: &ReplyContext<'_>) -> String {
        let lower = ctx.message.to_lowercase();

        if !ctx.history.is_empty() {
            if let Some(reply) = follow_up_reply(&topics(ctx), &lower) {
                debug!("[AI] Follow-up reply");
                return reply.to_string();
            }
        }

        if let Some((keyword, reply)) = KEYWORD_REPLIES.iter().find(|(k, _)| lower.contains(k)) {
            debug!(keyword, "[AI] Keyword reply");
            return reply.to_string();
        }

        debug!("[AI] Generic reply");
        GENERIC_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(GENERIC_REPLIES[0])
            .to_string()
    }
}

#[async_trait]
impl ResponseStrategy for FallbackStrategy {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn respond(&self, ctx: &ReplyContext<'_>) -> Result<String, ResponderError> {
        Ok(self.reply(ctx))
    }
}

/// Topic keywords found in user messages of the recent window, first-seen order.
fn topics(ctx: &ReplyContext<'_>) -> Vec<&'static str> {
    let mut found = Vec::new();

    for message in ctx.recent(TOPIC_WINDOW).iter().filter(|m| m.is_user) {
        let content = message.content.to_lowercase();
        for keyword in TOPIC_KEYWORDS {
            if content.contains(keyword) && !found.contains(&keyword) {
                found.push(keyword);
            }
        }
    }

    found
}

fn follow_up_reply(topics: &[&str], lower_message: &str) -> Option<&'static str> {
    if topics.contains(&"vendas") && lower_message.contains("resultado") {
        return Some(SALES_FOLLOW_UP);
    }
    if topics.contains(&"processo") && lower_message.contains("implementar") {
        return Some(PROCESS_FOLLOW_UP);
    }
    None
}

// endregion: --- Tests
