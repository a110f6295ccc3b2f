// src/models/quiz.rs
use crate::{
    error::{AppError, AppResult},
    store::Entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "pergunta")]
    pub text: String,
    #[serde(rename = "alternativas")]
    pub options: Vec<String>,
    // Índice (a partir de 0) da alternativa correta
    #[serde(rename = "respostaCorreta")]
    pub correct: usize,
}

/// Um quiz. A coleção onde está guardado (ativos, arquivados ou excluídos) é o seu estado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "perguntas", default)]
    pub questions: Vec<Question>,
    #[serde(rename = "criadoPor")]
    pub created_by: String,
    #[serde(rename = "criadoEm")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "modificadoEm", default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(rename = "archivedAt", default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(rename = "deletedAt", default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(rename = "deletedBy", default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl Entity for Quiz {
    fn id(&self) -> &str {
        &self.id
    }
}

// Corpo JSON de POST /api/quizzes e PUT /api/quizzes/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub perguntas: Vec<Question>,
}

impl QuizRequest {
    /// Valida o pedido e devolve (nome, perguntas) normalizados.
    pub fn validate(self) -> AppResult<(String, Vec<Question>)> {
        let name = self.nome.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("O nome do quiz é obrigatório".into()));
        }
        if self.perguntas.is_empty() {
            return Err(AppError::Validation("O quiz precisa de pelo menos uma pergunta".into()));
        }

        let mut questions = Vec::with_capacity(self.perguntas.len());
        for (i, q) in self.perguntas.into_iter().enumerate() {
            let numero = i + 1;
            let text = q.text.trim().to_string();
            if text.is_empty() {
                return Err(AppError::Validation(format!("Pergunta {} sem enunciado", numero)));
            }
            let options: Vec<String> = q.options.iter().map(|o| o.trim().to_string()).collect();
            if options.len() < 2 || options.iter().any(String::is_empty) {
                return Err(AppError::Validation(format!(
                    "Pergunta {} precisa de pelo menos duas alternativas preenchidas",
                    numero
                )));
            }
            if q.correct >= options.len() {
                return Err(AppError::Validation(format!(
                    "Pergunta {}: resposta correta fora das alternativas",
                    numero
                )));
            }
            questions.push(Question { text, options, correct: q.correct });
        }
        Ok((name, questions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> Question {
        Question { text: "2+2?".into(), options: vec!["3".into(), "4".into()], correct }
    }

    #[test]
    fn accepts_well_formed_quiz() {
        let req = QuizRequest { nome: " Q1 ".into(), perguntas: vec![question(1)] };
        let (name, questions) = req.validate().unwrap();
        assert_eq!(name, "Q1");
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn rejects_out_of_range_answer_and_empty_quiz() {
        let bad = QuizRequest { nome: "Q".into(), perguntas: vec![question(2)] };
        assert!(matches!(bad.validate(), Err(AppError::Validation(_))));

        let empty = QuizRequest { nome: "Q".into(), perguntas: vec![] };
        assert!(matches!(empty.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn lifecycle_stamps_are_omitted_when_absent() {
        let quiz = Quiz {
            id: "q1".into(),
            name: "Q1".into(),
            questions: vec![question(0)],
            created_by: "admin".into(),
            created_at: Utc::now(),
            modified_at: None,
            archived_at: None,
            deleted_at: None,
            deleted_by: None,
        };
        let json = serde_json::to_value(&quiz).unwrap();
        assert!(json.get("archivedAt").is_none());
        assert!(json.get("deletedAt").is_none());
        assert_eq!(json["perguntas"][0]["respostaCorreta"], 0);
    }
}
